use serde_json::Value;
use tracing::debug;

/// Coerces a raw UI/database value into text the way the form layer expects:
/// falsy values collapse to an empty string, integral numbers lose their `.0`.
pub(crate) fn text_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => String::new(),
        Some(Value::Bool(true)) => "true".to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number_text(number),
        Some(other) => other.to_string(),
    }
}

/// Truthiness of a raw value; used for every checkbox-style flag.
pub(crate) fn flag_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

fn number_text(number: &serde_json::Number) -> String {
    if let Some(int) = number.as_i64() {
        return if int == 0 { String::new() } else { int.to_string() };
    }
    if let Some(int) = number.as_u64() {
        return int.to_string();
    }
    match number.as_f64() {
        Some(float) if float == 0.0 => String::new(),
        Some(float) if float.is_finite() && float.fract() == 0.0 => format!("{float:.0}"),
        Some(float) => float.to_string(),
        None => number.to_string(),
    }
}

/// Best-effort date normalization: keep the first ten characters of either a
/// bare date or a full timestamp. Returns `None` for empty input so callers
/// can omit the target instead of blanking it. Cutting on a char boundary
/// means malformed input degrades to a shorter raw string, never an error.
pub(crate) fn normalize_date(value: &str) -> Option<String> {
    if value.is_empty() {
        return None;
    }

    let normalized = match value.char_indices().nth(10) {
        Some((cut, _)) => {
            debug!(raw = value, "truncating date-like value to its date prefix");
            value[..cut].to_string()
        }
        None => value.to_string(),
    };
    Some(normalized)
}

/// Leading-integer parse: optional sign then digits, surrounding whitespace
/// ignored, trailing garbage tolerated (`"4.0"` and `"4th"` both read as 4).
pub(crate) fn leading_integer(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };

    let end = digits
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    digits[..end].parse::<i64>().ok().map(|magnitude| sign * magnitude)
}
