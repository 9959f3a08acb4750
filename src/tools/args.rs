//! Argument parsing shared by all tools.
//!
//! Every check here runs before a tool touches storage or the network, so a
//! `ToolArgError` always means "nothing happened".

use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ToolArgError {
    #[error("arguments must be a JSON object")]
    NotAnObject,
    #[error("{0}")]
    Malformed(String),
    #[error("{field}: {message}")]
    Empty {
        field: &'static str,
        message: &'static str,
    },
    #[error("{field}: must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: u64,
        max: u64,
        value: u64,
    },
    #[error("{field}: must be a finite number >= 0")]
    NotNonNegative { field: &'static str },
}

/// Deserialize tool arguments. A missing (`null`) argument object is treated
/// as `{}` so tools without required fields accept it.
pub fn parse<T: DeserializeOwned>(args: Value) -> Result<T, ToolArgError> {
    let args = match args {
        Value::Null => Value::Object(serde_json::Map::new()),
        Value::Object(_) => args,
        _ => return Err(ToolArgError::NotAnObject),
    };
    serde_json::from_value(args).map_err(|e| ToolArgError::Malformed(e.to_string()))
}

pub fn require_non_empty(
    field: &'static str,
    value: &str,
    message: &'static str,
) -> Result<(), ToolArgError> {
    if value.is_empty() {
        return Err(ToolArgError::Empty { field, message });
    }
    Ok(())
}

pub fn check_range(field: &'static str, value: u64, min: u64, max: u64) -> Result<(), ToolArgError> {
    if value < min || value > max {
        return Err(ToolArgError::OutOfRange {
            field,
            min,
            max,
            value,
        });
    }
    Ok(())
}

pub fn check_duration(field: &'static str, value: Option<f64>) -> Result<(), ToolArgError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(ToolArgError::NotNonNegative { field }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sample {
        name: String,
        #[serde(default)]
        limit: Option<u32>,
    }

    #[test]
    fn parses_object() {
        let sample: Sample = parse(json!({"name": "x", "limit": 5, "extra": true})).unwrap();
        assert_eq!(sample.name, "x");
        assert_eq!(sample.limit, Some(5));
    }

    #[test]
    fn null_becomes_empty_object() {
        #[derive(Deserialize)]
        struct NoFields {}
        assert!(parse::<NoFields>(Value::Null).is_ok());
    }

    #[test]
    fn non_object_rejected() {
        assert_eq!(
            parse::<Sample>(json!([1])).unwrap_err(),
            ToolArgError::NotAnObject
        );
    }

    #[test]
    fn missing_field_reported() {
        let err = parse::<Sample>(json!({})).unwrap_err();
        assert!(err.to_string().contains("name"), "{err}");
    }

    #[test]
    fn fractional_integer_rejected() {
        assert!(parse::<Sample>(json!({"name": "x", "limit": 2.5})).is_err());
    }

    #[test]
    fn empty_string_rejected_with_message() {
        let err = require_non_empty("agent", "", "Agent name is required").unwrap_err();
        assert_eq!(err.to_string(), "agent: Agent name is required");
        assert!(require_non_empty("agent", "a", "Agent name is required").is_ok());
    }

    #[test]
    fn range_bounds_inclusive() {
        assert!(check_range("limit", 1, 1, 100).is_ok());
        assert!(check_range("limit", 100, 1, 100).is_ok());
        assert!(check_range("limit", 0, 1, 100).is_err());
        let err = check_range("limit", 101, 1, 100).unwrap_err();
        assert_eq!(err.to_string(), "limit: must be between 1 and 100, got 101");
    }

    #[test]
    fn duration_must_be_non_negative() {
        assert!(check_duration("duration", None).is_ok());
        assert!(check_duration("duration", Some(0.0)).is_ok());
        assert!(check_duration("duration", Some(12.5)).is_ok());
        assert!(check_duration("duration", Some(-1.0)).is_err());
        assert!(check_duration("duration", Some(f64::NAN)).is_err());
    }
}
