//! Lenient coercion of untyped request input
//!
//! Request bodies arrive from HTML forms, so numeric fields may be numbers,
//! numeric strings, empty strings or missing entirely. Every such field is
//! coerced here and nowhere else: anything that is not a finite number
//! becomes `0`.

use serde_json::{Map, Value};

use crate::{Error, Result};

/// Coerce a JSON value to a finite number, defaulting to `0`
pub fn number(value: Option<&Value>) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        Some(Value::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    };

    if n.is_finite() {
        n
    } else {
        0.0
    }
}

/// Coerce a JSON value to an optional number.
///
/// Absent, `null` and blank strings yield `None`; everything else goes through [`number`].
pub fn optional_number(value: Option<&Value>) -> Option<f64> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        other => Some(number(other)),
    }
}

/// Request body as a JSON object with alias-aware field lookup
#[derive(Debug, Clone, Default)]
pub struct Payload {
    fields: Map<String, Value>,
}

impl Payload {
    /// Wrap a request body; anything other than a JSON object (or `null`) is rejected
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            Value::Null => Ok(Self::default()),
            _ => Err(Error::InvalidInput(
                "Request body must be a JSON object".to_string(),
            )),
        }
    }

    /// First non-null value among `keys`, in priority order
    pub fn get_any(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter()
            .filter_map(|k| self.fields.get(*k))
            .find(|v| !v.is_null())
    }

    /// Single key lookup, treating `null` as absent
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.get_any(&[key])
    }

    /// True when `key` is present, even if explicitly `null`
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// First trimmed, non-blank text among `keys`. Numbers are rendered as text.
    pub fn text_any(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|k| match self.fields.get(*k)? {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .find(|s| !s.is_empty())
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.text_any(&[key])
    }

    /// Coerced number among `keys`, or `None` when none is present
    pub fn number_any(&self, keys: &[&str]) -> Option<f64> {
        self.get_any(keys).map(|v| number(Some(v)))
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.number_any(&[key])
    }
}
