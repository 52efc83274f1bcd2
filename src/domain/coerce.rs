//! Loose scalar coercion for raw sensor fields.
//!
//! Device firmware was written against a dynamically typed backend, so
//! the same field may arrive as a number, a numeric string, a one-element
//! array or a boolean. These helpers read any JSON value the way that
//! backend did: `to_number` follows the ECMAScript `ToNumber` rules and
//! `to_text` follows `ToString`.

use serde_json::Value;

/// Reads a JSON value as a number.
///
/// Returns `None` where the loose reading yields no number at all
/// (objects, multi-element arrays, non-numeric strings).
pub(crate) fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => str_to_number(s),
        Value::Array(_) => str_to_number(&to_text(value)),
        Value::Object(_) => None,
    }
}

/// Reads a JSON value as text.
pub(crate) fn to_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(n) => number_to_text(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => to_text(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn number_to_text(n: &serde_json::Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    // `f64`'s Display drops a zero fraction (`1.0` prints as `1`).
    n.as_f64().map_or_else(|| n.to_string(), |f| f.to_string())
}

fn str_to_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }

    let radix = match trimmed.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = trimmed.get(2..)?;
        return u64::from_str_radix(digits, radix).ok().map(|n| n as f64);
    }

    match trimmed {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    // Rust also accepts `inf` and `nan` spellings that the loose reading
    // rejects.
    if trimmed
        .chars()
        .any(|c| c.is_ascii_alphabetic() && !matches!(c, 'e' | 'E'))
    {
        return None;
    }
    trimmed.parse::<f64>().ok()
}
