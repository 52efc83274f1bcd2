//! Shared request helpers: a lenient JSON body extractor and field
//! deserializers used across endpoints.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::HardhatError;

/// JSON body extractor that tolerates device firmware quirks.
///
/// Unlike `axum::Json` it does not require a `Content-Type` header, and
/// an empty body is read as `{}` so that required-field checks report
/// the missing fields instead of a parse error. Anything that is not a
/// JSON object fails with [`HardhatError::InvalidBody`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LenientJson<T>(pub T);

impl<T, S> FromRequest<S> for LenientJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = HardhatError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| HardhatError::InvalidBody(e.body_text()))?;
        parse_body(&bytes).map(Self)
    }
}

/// Parses a request body, reading blank input as an empty object.
///
/// # Errors
///
/// Returns [`HardhatError::InvalidBody`] if the bytes are not a JSON
/// object matching `T`.
pub fn parse_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, HardhatError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return serde_json::from_str("{}").map_err(|e| HardhatError::InvalidBody(e.to_string()));
    }
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| HardhatError::InvalidBody(e.to_string()))?;
    if !value.is_object() {
        return Err(HardhatError::InvalidBody(
            "request body must be a JSON object".to_string(),
        ));
    }
    serde_json::from_value(value).map_err(|e| HardhatError::InvalidBody(e.to_string()))
}

/// Keeps a field's raw JSON value, including an explicit `null`.
///
/// Combined with `#[serde(default)]`, an absent field is `None` while
/// `"field": null` is `Some(Value::Null)`.
///
/// # Errors
///
/// Never fails for well-formed JSON.
pub fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Reads an optional sensor number from a JSON number or numeric string.
///
/// `null` gives `None`. Values of any other shape are dropped to `None`
/// with a warning rather than failing the whole reading.
///
/// # Errors
///
/// Never fails for well-formed JSON.
pub fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let number = match &value {
        Value::Null => None,
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    };
    if number.is_none() && !value.is_null() {
        tracing::warn!(%value, "ignoring non-numeric sensor value");
    }
    Ok(number)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "present")]
        raw: Option<Value>,
        #[serde(default, deserialize_with = "lenient_number")]
        num: Option<f64>,
    }

    #[test]
    fn absent_null_and_value_are_distinguished() {
        let Ok(absent) = parse_body::<Probe>(b"{}") else {
            panic!("parse failed");
        };
        assert_eq!(absent.raw, None);

        let Ok(null) = parse_body::<Probe>(br#"{"raw": null}"#) else {
            panic!("parse failed");
        };
        assert_eq!(null.raw, Some(Value::Null));

        let Ok(set) = parse_body::<Probe>(br#"{"raw": "hard"}"#) else {
            panic!("parse failed");
        };
        assert_eq!(set.raw, Some(Value::String("hard".into())));
    }

    #[test]
    fn sensor_numbers_accept_numbers_and_numeric_strings() {
        let cases: [(&[u8], Option<f64>); 5] = [
            (br#"{"num": 2.5}"#, Some(2.5)),
            (br#"{"num": " 7 "}"#, Some(7.0)),
            (br#"{"num": null}"#, None),
            (br#"{"num": "abc"}"#, None),
            (br#"{"num": [1]}"#, None),
        ];
        for (body, expected) in cases {
            let Ok(probe) = parse_body::<Probe>(body) else {
                panic!("parse failed");
            };
            assert_eq!(probe.num, expected);
        }
    }

    #[test]
    fn blank_body_reads_as_empty_object() {
        let Ok(probe) = parse_body::<Probe>(b"  \n") else {
            panic!("blank body should parse");
        };
        assert!(probe.raw.is_none());
        assert!(probe.num.is_none());
    }

    #[test]
    fn non_object_bodies_are_rejected() {
        for body in [&b"[1, 2]"[..], b"42", b"{not json"] {
            let result = parse_body::<Probe>(body);
            assert!(matches!(result, Err(HardhatError::InvalidBody(_))));
        }
    }
}
