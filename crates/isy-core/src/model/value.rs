// Numeric-or-display values.
//
// The controller reports most readings as numbers but formatted values
// (and some node-server properties) are free text such as "Heat" or
// "72°F". `Value` keeps both shapes explicit.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Numeric(f64),
    Display(String),
}

impl Default for Value {
    fn default() -> Self {
        Self::Numeric(0.0)
    }
}

impl Value {
    /// Parse `raw` as a finite number. Empty and non-finite text is rejected.
    pub fn parse_numeric(raw: &str) -> Option<f64> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// Numeric when `raw` parses cleanly, otherwise the text as given.
    pub fn coerce(raw: &str) -> Self {
        Self::parse_numeric(raw).map_or_else(|| Self::Display(raw.to_owned()), Self::Numeric)
    }

    /// The formatted counterpart of a raw numeric reading: the coerced
    /// formatted text when present, otherwise the raw number.
    pub fn formatted(raw: f64, formatted: Option<&str>) -> Self {
        formatted.map_or(Self::Numeric(raw), Self::coerce)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Numeric(v) => Some(*v),
            Self::Display(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Numeric(_) => None,
            Self::Display(s) => Some(s),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Numeric(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(v) => write!(f, "{v}"),
            Self::Display(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_prefers_numbers() {
        assert_eq!(Value::coerce("42"), Value::Numeric(42.0));
        assert_eq!(Value::coerce(" 7.5 "), Value::Numeric(7.5));
        assert_eq!(Value::coerce("Heat"), Value::Display("Heat".into()));
        assert_eq!(Value::coerce(""), Value::Display(String::new()));
        assert_eq!(Value::coerce("NaN"), Value::Display("NaN".into()));
    }

    #[test]
    fn formatted_falls_back_to_raw() {
        assert_eq!(Value::formatted(255.0, None), Value::Numeric(255.0));
        assert_eq!(Value::formatted(255.0, Some("On")), Value::Display("On".into()));
        assert_eq!(Value::formatted(144.0, Some("56")), Value::Numeric(56.0));
    }

    #[test]
    fn serializes_untagged() {
        let json = serde_json::to_string(&vec![Value::Numeric(1.5), Value::Display("Off".into())])
            .unwrap_or_default();
        assert_eq!(json, r#"[1.5,"Off"]"#);
    }
}
