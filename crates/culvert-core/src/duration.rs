//! Duration parsing utilities.

use crate::error::ConfigError;
use std::time::Duration;

/// Parse a duration string like "1h", "30m", "300s", "250ms" or "300".
/// Supports:
/// - Plain numbers (interpreted as seconds): "300"
/// - Milliseconds suffix: "250ms"
/// - Seconds suffix: "300s"
/// - Minutes suffix: "30m"
/// - Hours suffix: "1h"
pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(invalid(s, "empty duration string"));
    }

    let parse = |num_str: &str, unit: &str| -> Result<u64, ConfigError> {
        num_str
            .trim()
            .parse::<u64>()
            .map_err(|e| invalid(s, &format!("invalid {unit} value '{num_str}': {e}")))
    };

    let scaled = |num_str: &str, unit: &str, secs: u64| -> Result<Duration, ConfigError> {
        parse(num_str, unit)?
            .checked_mul(secs)
            .map(Duration::from_secs)
            .ok_or_else(|| invalid(s, &format!("{unit} value '{num_str}' is too large")))
    };

    // "ms" must be checked before "m" and "s"
    if let Some(num_str) = s.strip_suffix("ms") {
        return Ok(Duration::from_millis(parse(num_str, "milliseconds")?));
    }
    if let Some(num_str) = s.strip_suffix('h') {
        return scaled(num_str, "hours", 3600);
    }
    if let Some(num_str) = s.strip_suffix('m') {
        return scaled(num_str, "minutes", 60);
    }
    if let Some(num_str) = s.strip_suffix('s') {
        return Ok(Duration::from_secs(parse(num_str, "seconds")?));
    }

    // No suffix - treat as seconds
    Ok(Duration::from_secs(parse(s, "seconds")?))
}

/// Render a duration in the shortest form [`parse_duration`] reads back.
pub fn format_duration(duration: Duration) -> String {
    if duration.subsec_nanos() == 0 {
        format!("{}s", duration.as_secs())
    } else {
        format!("{}ms", duration.as_millis())
    }
}

fn invalid(value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidDuration {
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Serde adapter for duration strings.
pub mod serde_str {
    use super::{format_duration, parse_duration};
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_duration(*duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        // Accept both `timeout: 60` and `timeout: "60s"`
        let raw = serde_yaml::Value::deserialize(deserializer)?;
        let text = match raw {
            serde_yaml::Value::Number(n) => n.to_string(),
            serde_yaml::Value::String(s) => s,
            other => {
                return Err(serde::de::Error::custom(format!(
                    "expected duration string, got {other:?}"
                )))
            }
        };
        parse_duration(&text).map_err(serde::de::Error::custom)
    }
}
