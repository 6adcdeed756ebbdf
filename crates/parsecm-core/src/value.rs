use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// A scalar read from a text field, typed by the first parse that succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Floats, with integers widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Coercion
// ---------------------------------------------------------------------------

/// Coerce `token` to an int, else a float, else keep it as a string.
///
/// The whole token must parse; `"12abc"` stays a string.
pub fn coerce(token: &str) -> Value {
    if let Ok(i) = token.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(x) = token.parse::<f64>() {
        return Value::Float(x);
    }
    Value::Str(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_int() {
        assert_eq!(coerce("123"), Value::Int(123));
        assert_eq!(coerce("-4"), Value::Int(-4));
    }

    #[test]
    fn coerce_float() {
        assert_eq!(coerce("1.5"), Value::Float(1.5));
        assert_eq!(coerce("-0.234681605818"), Value::Float(-0.234681605818));
        assert_eq!(coerce("1e3"), Value::Float(1000.0));
    }

    #[test]
    fn coerce_string_fallback() {
        assert_eq!(coerce("AONMMODE"), Value::Str("AONMMODE".to_string()));
        assert_eq!(coerce(""), Value::Str(String::new()));
        assert_eq!(coerce("12abc"), Value::Str("12abc".to_string()));
        assert_eq!(
            coerce("2008:046:05:15:43.038"),
            Value::Str("2008:046:05:15:43.038".to_string())
        );
    }

    #[test]
    fn coerce_int_overflow_falls_to_float() {
        assert_eq!(coerce("99999999999999999999"), Value::Float(1e20));
    }

    #[test]
    fn accessors() {
        assert_eq!(Value::Int(4).as_f64(), Some(4.0));
        assert_eq!(Value::Float(4.5).as_i64(), None);
        assert_eq!(Value::from("GG277").as_str(), Some("GG277"));
    }

    #[test]
    fn serializes_untagged() {
        let json = serde_json::to_string(&vec![
            Value::Int(10870),
            Value::Float(1.5),
            Value::from("IN_IA"),
        ])
        .unwrap();
        assert_eq!(json, r#"[10870,1.5,"IN_IA"]"#);
    }

    #[test]
    fn display_matches_input() {
        assert_eq!(Value::Int(4).to_string(), "4");
        assert_eq!(Value::Float(0.25).to_string(), "0.25");
        assert_eq!(Value::from("AONMMODE").to_string(), "AONMMODE");
    }
}
