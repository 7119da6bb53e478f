///! Backend answer sanitizer and validator
///!
///! The model is asked for bare JSON but regularly wraps it in markdown
///! fences anyway, sometimes more than once.

use serde_json::Value;

use baja_common::{FIELD_NAMES, Readings};
use super::error::FetchError;

const FENCE: &str = "```";

/// Remove surrounding whitespace and any number of enclosing code fences,
/// including a language tag on the opening fence (```` ```json ````).
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    loop {
        let mut changed = false;

        if let Some(rest) = text.strip_prefix(FENCE) {
            text = match rest.find('\n') {
                Some(pos) if is_fence_tag(&rest[..pos]) => &rest[pos + 1..],
                _ => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
            }
            .trim();
            changed = true;
        }

        if let Some(rest) = text.strip_suffix(FENCE) {
            text = rest.trim();
            changed = true;
        }

        if !changed {
            return text;
        }
    }
}

/// "json", "JSON", "" and the like; anything else on the fence line is content.
fn is_fence_tag(line: &str) -> bool {
    line.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.'))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Sanitize, parse and validate one backend answer.
///
/// Known keys must hold strings (numbers are kept as their JSON text, `null`
/// is treated as absent). Unknown keys are ignored. An object carrying none of
/// the known keys is rejected.
pub fn parse_readings(raw: &str) -> Result<Readings, FetchError> {
    let cleaned = strip_code_fences(raw);
    if cleaned.is_empty() {
        return Err(FetchError::DataFormat("empty response".to_string()));
    }

    let value: Value = serde_json::from_str(cleaned)
        .map_err(|e| FetchError::DataFormat(format!("not valid JSON: {}", e)))?;

    let map = match value {
        Value::Object(map) => map,
        other => {
            return Err(FetchError::DataFormat(format!(
                "expected a JSON object, got {}",
                json_type(&other)
            )));
        }
    };

    let mut readings = Readings::default();
    for field in FIELD_NAMES {
        let reading = match map.get(field) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(other) => {
                return Err(FetchError::DataFormat(format!(
                    "field `{}` must be a string, got {}",
                    field,
                    json_type(other)
                )));
            }
        };
        readings.set(field, reading);
    }

    if readings.present_count() == 0 {
        return Err(FetchError::DataFormat(
            "none of the expected fields are present".to_string(),
        ));
    }

    Ok(readings)
}
