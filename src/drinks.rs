use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Beverages offered on the form, each with a fixed strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DrinkType {
    /// Beer, 5%
    Beer,
    /// Wine, 12%
    Wine,
    /// Awamori, 30%
    Awamori,
    /// Whisky, 40%
    Whisky,
    /// Whisky poured strong, 50%
    WhiskyStrong,
}

impl DrinkType {
    /// Every drink in display order; the first one is the form default
    pub const ALL: [DrinkType; 5] = [
        DrinkType::Beer,
        DrinkType::Wine,
        DrinkType::Awamori,
        DrinkType::Whisky,
        DrinkType::WhiskyStrong,
    ];

    /// Alcohol by volume, in percent
    pub fn strength_pct(self) -> f64 {
        match self {
            DrinkType::Beer => 5.0,
            DrinkType::Wine => 12.0,
            DrinkType::Awamori => 30.0,
            DrinkType::Whisky => 40.0,
            DrinkType::WhiskyStrong => 50.0,
        }
    }

    /// Label written to the `drink_type` column
    pub fn label(self) -> &'static str {
        match self {
            DrinkType::Beer => "Beer (5%)",
            DrinkType::Wine => "Wine (12%)",
            DrinkType::Awamori => "Awamori (30%)",
            DrinkType::Whisky => "Whisky (40%)",
            DrinkType::WhiskyStrong => "Whisky strong (50%)",
        }
    }

    /// Short key used on the command line and in the HTTP API
    pub fn key(self) -> &'static str {
        match self {
            DrinkType::Beer => "beer",
            DrinkType::Wine => "wine",
            DrinkType::Awamori => "awamori",
            DrinkType::Whisky => "whisky",
            DrinkType::WhiskyStrong => "whisky-strong",
        }
    }

    /// Labels used by sheets that were filled in before this tool existed
    fn legacy_label(self) -> &'static str {
        match self {
            DrinkType::Beer => "ビール (5%)",
            DrinkType::Wine => "ワイン (12%)",
            DrinkType::Awamori => "泡盛 (30%)",
            DrinkType::Whisky => "ウイスキー (40%)",
            DrinkType::WhiskyStrong => "ウイスキー濃いめ (50%)",
        }
    }

    /// Resolve a stored label, short key or legacy label
    pub fn from_label(s: &str) -> Option<DrinkType> {
        let s = s.trim();
        DrinkType::ALL.into_iter().find(|d| {
            d.label().eq_ignore_ascii_case(s) || d.key().eq_ignore_ascii_case(s) || d.legacy_label() == s
        })
    }
}

impl Default for DrinkType {
    fn default() -> Self {
        DrinkType::ALL[0]
    }
}

impl fmt::Display for DrinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DrinkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DrinkType::from_label(s).ok_or_else(|| format!("Unknown drink type '{}'", s))
    }
}
