//! Scalar values appearing in descriptors and expressions

use std::fmt;

use serde::{Deserialize, Serialize};

/// A scalar as it appears in the Vega-Lite wire form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Literal {
    /// Numeric view of the literal, if it is a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Literal::Int(v) => Some(*v as f64),
            Literal::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Literal::Int(v) => Some(*v),
            Literal::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    /// Strict equality with JavaScript `===` semantics: numbers compare by
    /// value regardless of integer/float representation, nothing coerces.
    pub fn strict_eq(&self, other: &Literal) -> bool {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => match (self, other) {
                (Literal::Text(a), Literal::Text(b)) => a == b,
                (Literal::Bool(a), Literal::Bool(b)) => a == b,
                _ => false,
            },
        }
    }

    /// Key used when the literal names a field, e.g. a pivoted column
    pub fn key(&self) -> String {
        match self {
            Literal::Text(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Parse a command-line or config value, preferring numbers
    pub fn parse(raw: &str) -> Self {
        if let Ok(v) = raw.parse::<i64>() {
            Literal::Int(v)
        } else if let Ok(v) = raw.parse::<f64>() {
            Literal::Float(v)
        } else if let Ok(v) = raw.parse::<bool>() {
            Literal::Bool(v)
        } else {
            Literal::Text(raw.to_string())
        }
    }
}

/// Renders the literal as a Vega expression term
impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(v) => write!(f, "{}", v),
            Literal::Int(v) => write!(f, "{}", v),
            Literal::Float(v) => write!(f, "{}", v),
            Literal::Text(s) => {
                write!(f, "'")?;
                for c in s.chars() {
                    match c {
                        '\'' => write!(f, "\\'")?,
                        '\\' => write!(f, "\\\\")?,
                        c => write!(f, "{}", c)?,
                    }
                }
                write!(f, "'")
            }
        }
    }
}

impl From<i64> for Literal {
    fn from(v: i64) -> Self {
        Literal::Int(v)
    }
}

impl From<i32> for Literal {
    fn from(v: i32) -> Self {
        Literal::Int(v as i64)
    }
}

impl From<f64> for Literal {
    fn from(v: f64) -> Self {
        Literal::Float(v)
    }
}

impl From<bool> for Literal {
    fn from(v: bool) -> Self {
        Literal::Bool(v)
    }
}

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Literal::Text(v.to_string())
    }
}

impl From<String> for Literal {
    fn from(v: String) -> Self {
        Literal::Text(v)
    }
}
