use std::{convert::Infallible, fmt, str::FromStr};

use log::warn;

/// The average height of a floor, in meters.
pub const AVERAGE_FLOOR_HEIGHT: f32 = 2.8;

/// What a building was used for, encoded as the model's first feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UsageCategory {
    #[default]
    Education = 1,
    Office = 2,
    Retail = 3,
    Hospital = 4,
    Residential = 5,
}

impl UsageCategory {
    pub const ALL: [UsageCategory; 5] = [
        UsageCategory::Education,
        UsageCategory::Office,
        UsageCategory::Retail,
        UsageCategory::Hospital,
        UsageCategory::Residential,
    ];

    /// The numeric code the model was trained with.
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            UsageCategory::Education => "education",
            UsageCategory::Office => "office",
            UsageCategory::Retail => "retail",
            UsageCategory::Hospital => "hospital",
            UsageCategory::Residential => "residential",
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|usage| usage.code() == code)
    }
}

impl fmt::Display for UsageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses a usage by name (case insensitive) or by code.
///
/// Anything unrecognized falls back to `Education`.
impl FromStr for UsageCategory {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        let usage = match s.parse::<u8>() {
            Ok(code) => Self::from_code(code),
            Err(_) => Self::ALL
                .into_iter()
                .find(|usage| usage.name().eq_ignore_ascii_case(s)),
        };

        Ok(usage.unwrap_or_else(|| {
            warn!("unknown usage {s:?}, using {}", UsageCategory::default());
            UsageCategory::default()
        }))
    }
}

/// The attributes of a building the model predicts from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildingAttributes {
    pub usage: UsageCategory,
    /// Gross floor area, in square meters.
    pub gfa: f32,
    /// Volume in cubic meters, estimated from the floor area when unknown or zero.
    pub volume: Option<f32>,
    pub floor: f32,
}

impl BuildingAttributes {
    /// The known volume, or an estimate from the floor area when it is missing or zero.
    pub fn volume(&self) -> f32 {
        self.volume
            .filter(|&volume| volume != 0.)
            .unwrap_or(self.floor * self.gfa * AVERAGE_FLOOR_HEIGHT)
    }

    /// The model input for this building: `[usage, gfa, volume, floor]`.
    pub fn features(&self) -> [f32; 4] {
        [
            self.usage.code() as f32,
            self.gfa,
            self.volume(),
            self.floor,
        ]
    }
}
