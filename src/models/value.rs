use std::fmt;

use serde::{Deserialize, Serialize};

/// A primitive attribute value.
///
/// Serialized untagged, so a snapshot holds plain JSON scalars. Anything that
/// is not a scalar (null, arrays, objects) fails to deserialize into a
/// `Value`, which is how the snapshot loader detects attributes it cannot
/// represent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// Coerce a bare (unquoted) token: integers first, then floats, and
    /// everything else stays a string.
    pub fn coerce(token: &str) -> Self {
        if !looks_numeric(token) {
            return Self::Str(token.to_string());
        }
        if let Ok(n) = token.parse::<i64>() {
            return Self::Int(n);
        }
        match token.parse::<f64>() {
            Ok(f) if f.is_finite() => Self::Float(f),
            _ => Self::Str(token.to_string()),
        }
    }

    /// The value as plain text, without quoting.
    pub fn to_text(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            other => other.to_string(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// `f64::from_str` also accepts `inf`, `NaN` and friends; a numeric literal
/// here must be built from digits, signs, a decimal point and an exponent.
fn looks_numeric(token: &str) -> bool {
    token.bytes().any(|b| b.is_ascii_digit())
        && token
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
}

/// Dictionary-style rendering: strings are single-quoted, numbers and
/// booleans are bare.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(n) => write!(f, "{}", n),
            // Debug keeps the trailing `.0` on whole floats
            Self::Float(x) => write!(f, "{:?}", x),
            Self::Str(s) => write_quoted(f, s),
        }
    }
}

pub(crate) fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("'")?;
    for c in s.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '\'' => f.write_str("\\'")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str("'")
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}
