//! Ambient light state and its normalizer.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

use super::coerce;

/// Canonical light state stored in `impact_events.light_state`.
///
/// Labels outside the four known states are kept verbatim in
/// [`LightState::Other`] (trimmed and lowercased) instead of being
/// rejected, so readings from firmware with new labels are not lost.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LightState {
    /// Sensor reads darkness.
    Dark,
    /// Sensor reads bright light.
    Bright,
    /// Normal ambient light.
    Normal,
    /// No light reading available.
    None,
    /// Unrecognized label, stored as received.
    Other(String),
}

impl LightState {
    /// Returns the stored string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Dark => "dark",
            Self::Bright => "bright",
            Self::Normal => "normal",
            Self::None => "none",
            Self::Other(label) => label,
        }
    }

    /// Returns `true` for the four recognized states.
    #[must_use]
    pub const fn is_canonical(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Maps a label onto a state, trimming and lowercasing it first.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let s = label.trim().to_lowercase();
        match s.as_str() {
            "dark" => Self::Dark,
            "bright" => Self::Bright,
            "normal" => Self::Normal,
            "none" => Self::None,
            _ => Self::Other(s),
        }
    }
}

impl fmt::Display for LightState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LightState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Normalizes a raw `light` field into a [`LightState`].
///
/// Absent or `null` input yields [`LightState::None`]. Other JSON values
/// are read as text first (`5` → `"5"`, `1.0` → `"1"`, `["Dark"]` →
/// `"Dark"`) and then go through the same label matching as strings.
#[must_use]
pub fn normalize_light(raw: Option<&Value>) -> LightState {
    match raw {
        None | Some(Value::Null) => LightState::None,
        Some(Value::String(s)) => LightState::from_label(s),
        Some(other) => LightState::from_label(&coerce::to_text(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn norm(v: Value) -> String {
        normalize_light(Some(&v)).as_str().to_string()
    }

    #[test]
    fn canonical_labels_are_case_and_whitespace_insensitive() {
        assert_eq!(norm(json!(" Dark ")), "dark");
        assert_eq!(norm(json!("BRIGHT")), "bright");
        assert_eq!(norm(json!("normal")), "normal");
        assert_eq!(norm(json!("None")), "none");
    }

    #[test]
    fn absent_and_null_become_none() {
        assert_eq!(normalize_light(None), LightState::None);
        assert_eq!(normalize_light(Some(&Value::Null)), LightState::None);
    }

    #[test]
    fn unknown_labels_pass_through_lowercased() {
        assert_eq!(norm(json!("foo")), "foo");
        assert_eq!(norm(json!("  Dusk ")), "dusk");
        assert!(!normalize_light(Some(&json!("dusk"))).is_canonical());
    }

    #[test]
    fn non_string_values_are_stringified() {
        assert_eq!(norm(json!(5)), "5");
        assert_eq!(norm(json!(true)), "true");
        assert_eq!(norm(json!(1.0)), "1");
        assert_eq!(norm(json!(["Dark"])), "dark");
        assert_eq!(norm(json!({"a": 1})), "[object object]");
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&LightState::Other("dusk".to_string())).ok();
        assert_eq!(json.as_deref(), Some("\"dusk\""));
        let json = serde_json::to_string(&LightState::Bright).ok();
        assert_eq!(json.as_deref(), Some("\"bright\""));
    }
}
