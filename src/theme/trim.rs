//! Trim sizes for printed books

use serde::{Deserialize, Serialize};

/// Finished page size of the book
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrimSize {
    Standard5x8,
    Standard5_25x8,
    Standard5_5x8_5,
    Standard6x9,
    Nonstandard5_06x7_81,
    Nonstandard5_5x8_25,
    Nonstandard6_14x9_21,
    International4_72x7_48,
    International4_92x7_48,
    International5_83x8_27,
    International5_31x8_46,
    MassMarket4_12x6_75,
    MassMarket4_25x7,
    MassMarket4_37x7,
    /// Arbitrary size in inches
    Custom { width: f32, height: f32 },
}

impl Default for TrimSize {
    fn default() -> Self {
        TrimSize::Standard6x9
    }
}

impl TrimSize {
    /// Named sizes offered to users, in display order
    pub const NAMED: [TrimSize; 14] = [
        TrimSize::Standard5x8,
        TrimSize::Standard5_25x8,
        TrimSize::Standard5_5x8_5,
        TrimSize::Standard6x9,
        TrimSize::Nonstandard5_06x7_81,
        TrimSize::Nonstandard5_5x8_25,
        TrimSize::Nonstandard6_14x9_21,
        TrimSize::International4_72x7_48,
        TrimSize::International4_92x7_48,
        TrimSize::International5_83x8_27,
        TrimSize::International5_31x8_46,
        TrimSize::MassMarket4_12x6_75,
        TrimSize::MassMarket4_25x7,
        TrimSize::MassMarket4_37x7,
    ];

    /// Width and height in inches
    pub fn dimensions(&self) -> (f32, f32) {
        match *self {
            TrimSize::Standard5x8 => (5.0, 8.0),
            TrimSize::Standard5_25x8 => (5.25, 8.0),
            TrimSize::Standard5_5x8_5 => (5.5, 8.5),
            TrimSize::Standard6x9 => (6.0, 9.0),
            TrimSize::Nonstandard5_06x7_81 => (5.06, 7.81),
            TrimSize::Nonstandard5_5x8_25 => (5.5, 8.25),
            TrimSize::Nonstandard6_14x9_21 => (6.14, 9.21),
            TrimSize::International4_72x7_48 => (4.72, 7.48),
            TrimSize::International4_92x7_48 => (4.92, 7.48),
            TrimSize::International5_83x8_27 => (5.83, 8.27),
            TrimSize::International5_31x8_46 => (5.31, 8.46),
            TrimSize::MassMarket4_12x6_75 => (4.12, 6.75),
            TrimSize::MassMarket4_25x7 => (4.25, 7.0),
            TrimSize::MassMarket4_37x7 => (4.37, 7.0),
            TrimSize::Custom { width, height } => (width, height),
        }
    }

    /// Human-readable label
    pub fn description(&self) -> String {
        let (w, h) = self.dimensions();
        let class = match self {
            TrimSize::Standard5x8
            | TrimSize::Standard5_25x8
            | TrimSize::Standard5_5x8_5
            | TrimSize::Standard6x9 => "Standard",
            TrimSize::Nonstandard5_06x7_81
            | TrimSize::Nonstandard5_5x8_25
            | TrimSize::Nonstandard6_14x9_21 => "Nonstandard",
            TrimSize::International4_72x7_48
            | TrimSize::International4_92x7_48
            | TrimSize::International5_83x8_27
            | TrimSize::International5_31x8_46 => "International",
            TrimSize::MassMarket4_12x6_75
            | TrimSize::MassMarket4_25x7
            | TrimSize::MassMarket4_37x7 => "Mass Market",
            TrimSize::Custom { .. } => "Custom",
        };
        format!("{}×{} - {} Trim Size", w, h, class)
    }
}
