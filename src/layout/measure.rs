//! Text measurement
//!
//! The pagination engine only ever asks one question: how tall is this text
//! when wrapped to a given width. [`TextMeasure`] is that question;
//! [`MetricsMeasure`] answers it from advance-width tables.

use crate::error::MeasureError;
use crate::layout::font::{FontLibrary, FontSpec};
use crate::layout::line_break::LineBreaker;

/// Size of a wrapped block of text, in points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextExtent {
    pub width: f32,
    pub height: f32,
}

/// Measurement oracle
///
/// Implementations must be idempotent: the same inputs always give the same
/// extent. Height is `lines × size × line_spacing`.
pub trait TextMeasure {
    fn measure(
        &self,
        text: &str,
        font: &FontSpec,
        size: f32,
        line_spacing: f32,
        max_width: f32,
    ) -> Result<TextExtent, MeasureError>;
}

impl<T: TextMeasure + ?Sized> TextMeasure for &T {
    fn measure(
        &self,
        text: &str,
        font: &FontSpec,
        size: f32,
        line_spacing: f32,
        max_width: f32,
    ) -> Result<TextExtent, MeasureError> {
        (**self).measure(text, font, size, line_spacing, max_width)
    }
}

/// Reject geometry no layout backend can honour
pub fn validate(size: f32, line_spacing: f32, max_width: f32) -> Result<(), MeasureError> {
    if !(max_width.is_finite() && max_width > 0.0) {
        return Err(MeasureError::InvalidWidth(max_width));
    }
    if !(size.is_finite() && size > 0.0 && line_spacing.is_finite() && line_spacing > 0.0) {
        return Err(MeasureError::InvalidSize { size, line_spacing });
    }
    Ok(())
}

/// Measures text with [`FontLibrary`] widths and [`LineBreaker`] wrapping
#[derive(Debug, Clone, Default)]
pub struct MetricsMeasure {
    fonts: FontLibrary,
    breaker: LineBreaker,
}

impl MetricsMeasure {
    pub fn new(fonts: FontLibrary) -> Self {
        Self {
            fonts,
            breaker: LineBreaker::new(),
        }
    }

    pub fn fonts(&self) -> &FontLibrary {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut FontLibrary {
        &mut self.fonts
    }
}

impl TextMeasure for MetricsMeasure {
    fn measure(
        &self,
        text: &str,
        font: &FontSpec,
        size: f32,
        line_spacing: f32,
        max_width: f32,
    ) -> Result<TextExtent, MeasureError> {
        validate(size, line_spacing, max_width)?;

        let metrics = self.fonts.resolve(&font.family);
        let lines = self
            .breaker
            .wrap(text, metrics, size * font.width_factor(), max_width);

        let width = lines.iter().map(|l| l.width).fold(0.0, f32::max);
        let height = lines.len() as f32 * size * line_spacing;
        Ok(TextExtent { width, height })
    }
}
