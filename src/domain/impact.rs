//! Impact severity and its normalizer.
//!
//! Firmware revisions report impact as a numeric code (`2`, `"2"`, `2.4`)
//! or as a label (`"hard"`). [`normalize_impact`] folds every shape into
//! one of four canonical levels. It never fails: unrecognized input maps
//! to [`ImpactSeverity::None`] so that readings from unknown firmware are
//! still recorded.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::coerce;

/// Canonical impact severity, stored as an integer in `0..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "i32")]
pub enum ImpactSeverity {
    /// No impact detected (`0`).
    None,
    /// Light knock (`1`).
    Light,
    /// Hard impact (`2`).
    Hard,
    /// Severe impact (`3`).
    Severe,
}

impl ImpactSeverity {
    /// Returns the integer code persisted in `impact_events.impact`.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Light => 1,
            Self::Hard => 2,
            Self::Severe => 3,
        }
    }

    /// Returns the lowercase label accepted on input.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Light => "light",
            Self::Hard => "hard",
            Self::Severe => "severe",
        }
    }

    /// Maps a finite number onto the closed range `[0, 3]`, rounding
    /// fractional values to the nearest level.
    #[must_use]
    pub fn from_number(value: f64) -> Self {
        if !value.is_finite() || value <= 0.0 {
            return Self::None;
        }
        if value >= 3.0 {
            return Self::Severe;
        }
        // Rounds half up; the value is strictly inside (0, 3) here.
        match value.round() {
            r if r < 1.0 => Self::None,
            r if r < 2.0 => Self::Light,
            r if r < 3.0 => Self::Hard,
            _ => Self::Severe,
        }
    }

    /// Parses a case-insensitive, whitespace-trimmed label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "none" => Some(Self::None),
            "light" => Some(Self::Light),
            "hard" => Some(Self::Hard),
            "severe" => Some(Self::Severe),
            _ => None,
        }
    }
}

impl From<ImpactSeverity> for i32 {
    fn from(severity: ImpactSeverity) -> Self {
        severity.code()
    }
}

impl fmt::Display for ImpactSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Normalizes a raw `impact` field into an [`ImpactSeverity`].
///
/// - absent or `null` → `None`
/// - anything that reads as a finite number (numbers, numeric strings,
///   `"0x2"`, `[2]`, booleans) → clamped to `[0, 3]` and rounded
/// - `"none"`, `"light"`, `"hard"`, `"severe"` in any case → matching level
/// - anything else → `None`
#[must_use]
pub fn normalize_impact(raw: Option<&Value>) -> ImpactSeverity {
    let Some(value) = raw.filter(|v| !v.is_null()) else {
        return ImpactSeverity::None;
    };
    match coerce::to_number(value) {
        Some(n) if n.is_finite() => ImpactSeverity::from_number(n),
        _ => ImpactSeverity::from_label(&coerce::to_text(value)).unwrap_or(ImpactSeverity::None),
    }
}
