//! Font metrics for layout
//!
//! Widths are stored in em units and scaled by the font size at measurement time.

use rustc_hash::FxHashMap;

/// Advance widths of printable ASCII (0x20..=0x7E) for a Times-like serif, in 1/1000 em
const SERIF_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278, // ' '..'/'
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444, // '0'..'?'
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722, // '@'..'O'
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500, // 'P'..'_'
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500, // '`'..'o'
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541, // 'p'..'~'
];

/// Bold faces are set slightly wider than their regular counterparts
const BOLD_WIDTH_FACTOR: f32 = 1.05;

/// Per-character advance widths of one font family
#[derive(Debug, Clone)]
pub struct FontMetrics {
    /// Width of ASCII characters (0-127), in em
    pub char_widths: Vec<f32>,
    /// Default width for non-ASCII characters, in em
    pub default_width: f32,
}

impl Default for FontMetrics {
    /// Monospace at half an em
    fn default() -> Self {
        Self::monospace(0.5)
    }
}

impl FontMetrics {
    pub fn new(char_widths: Vec<f32>, default_width: f32) -> Self {
        Self {
            char_widths,
            default_width,
        }
    }

    /// Every character `width` em wide
    pub fn monospace(width: f32) -> Self {
        let mut char_widths = vec![width; 128];
        for w in &mut char_widths[..0x20] {
            *w = 0.0;
        }
        Self {
            char_widths,
            default_width: width,
        }
    }

    /// Times-like proportional serif
    pub fn serif() -> Self {
        let mut char_widths = vec![0.0; 128];
        for (i, w) in SERIF_WIDTHS.iter().enumerate() {
            char_widths[0x20 + i] = f32::from(*w) / 1000.0;
        }
        Self {
            char_widths,
            default_width: 0.5,
        }
    }

    /// Width of a character, in em
    pub fn width(&self, c: char) -> f32 {
        match c {
            '\t' => self.width(' ') * 4.0,
            '\u{00A0}' => self.width(' '),
            c if c.is_control() => 0.0,
            c if c.is_ascii() => self
                .char_widths
                .get(c as usize)
                .copied()
                .unwrap_or(self.default_width),
            _ => self.default_width,
        }
    }

    /// Width of a string, in em
    pub fn text_width(&self, text: &str) -> f32 {
        text.chars().map(|c| self.width(c)).sum()
    }
}

/// A font request: family plus face
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontSpec {
    pub family: String,
    pub bold: bool,
    pub italic: bool,
}

impl FontSpec {
    pub fn regular(family: &str) -> Self {
        Self {
            family: family.to_string(),
            bold: false,
            italic: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Horizontal scale applied on top of the family's widths
    pub fn width_factor(&self) -> f32 {
        if self.bold {
            BOLD_WIDTH_FACTOR
        } else {
            1.0
        }
    }
}

/// Library of known font families
///
/// Lookups are case-insensitive; unknown families use the fallback metrics.
#[derive(Debug, Clone)]
pub struct FontLibrary {
    fonts: FxHashMap<String, FontMetrics>,
    fallback: FontMetrics,
}

impl Default for FontLibrary {
    fn default() -> Self {
        let mut library = Self {
            fonts: FxHashMap::default(),
            fallback: FontMetrics::default(),
        };
        for family in ["Times New Roman", "Times", "Georgia", "Garamond"] {
            library.set(family, FontMetrics::serif());
        }
        for family in ["Courier New", "Courier"] {
            library.set(family, FontMetrics::monospace(0.6));
        }
        library
    }
}

impl FontLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the metrics for a family
    pub fn set(&mut self, family: &str, metrics: FontMetrics) {
        self.fonts.insert(family.to_lowercase(), metrics);
    }

    /// Metrics registered for a family, if any
    pub fn get(&self, family: &str) -> Option<&FontMetrics> {
        self.fonts.get(&family.to_lowercase())
    }

    /// Metrics for a family, falling back when it is unknown
    pub fn resolve(&self, family: &str) -> &FontMetrics {
        self.get(family).unwrap_or(&self.fallback)
    }

    pub fn set_fallback(&mut self, metrics: FontMetrics) {
        self.fallback = metrics;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serif_widths() {
        let serif = FontMetrics::serif();
        assert_eq!(serif.width(' '), 0.25);
        assert_eq!(serif.width('m'), 0.778);
        assert_eq!(serif.width('~'), 0.541);
        assert_eq!(serif.width('\u{00A0}'), serif.width(' '));
        assert_eq!(serif.width('é'), 0.5);
        assert_eq!(serif.width('\n'), 0.0);
    }

    #[test]
    fn test_library_lookup_is_case_insensitive() {
        let library = FontLibrary::default();
        assert!(library.get("times new roman").is_some());
        assert!(library.get("TIMES NEW ROMAN").is_some());
        assert!(library.get("Comic Sans").is_none());
        assert_eq!(library.resolve("Comic Sans").width('m'), 0.5);
    }

    #[test]
    fn test_custom_family() {
        let mut library = FontLibrary::new();
        library.set("Block", FontMetrics::monospace(1.0));
        assert_eq!(library.resolve("block").text_width("abc"), 3.0);
    }

    #[test]
    fn test_bold_is_wider() {
        let spec = FontSpec::regular("Times").bold();
        assert!(spec.width_factor() > FontSpec::regular("Times").width_factor());
    }
}
