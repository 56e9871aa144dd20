//! Declarative data transforms
//!
//! Predicates and derived-field expressions are kept structured so that they
//! can be evaluated locally, and are rendered to the Vega expression strings
//! the collaborator expects when serialized.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::literal::Literal;

/// One step of a chart's transform pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Transform {
    Filter {
        filter: Predicate,
    },
    Pivot {
        pivot: String,
        value: String,
        groupby: Vec<String>,
    },
    Calculate {
        calculate: Expr,
        #[serde(rename = "as")]
        as_field: String,
    },
}

impl Transform {
    pub fn filter(predicate: Predicate) -> Self {
        Transform::Filter { filter: predicate }
    }

    pub fn pivot(pivot: impl Into<String>, value: impl Into<String>, groupby: &[&str]) -> Self {
        Transform::Pivot {
            pivot: pivot.into(),
            value: value.into(),
            groupby: groupby.iter().map(|g| g.to_string()).collect(),
        }
    }

    pub fn calculate(expr: Expr, as_field: impl Into<String>) -> Self {
        Transform::Calculate {
            calculate: expr,
            as_field: as_field.into(),
        }
    }
}

/// Row predicate of a filter transform
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `datum.<field> === <Param>`
    FieldEqualsParam { field: String, param: String },
    /// `datum.<field> === <literal>`
    FieldEquals { field: String, value: Literal },
    /// Disjunction of the inner predicates
    Any(Vec<Predicate>),
}

impl Predicate {
    pub fn field_equals_param(field: impl Into<String>, param: impl Into<String>) -> Self {
        Predicate::FieldEqualsParam {
            field: field.into(),
            param: param.into(),
        }
    }

    pub fn field_equals(field: impl Into<String>, value: impl Into<Literal>) -> Self {
        Predicate::FieldEquals {
            field: field.into(),
            value: value.into(),
        }
    }

    /// `datum.<field> === a || datum.<field> === b || ...`
    pub fn field_in(field: &str, values: impl IntoIterator<Item = Literal>) -> Self {
        Predicate::Any(
            values
                .into_iter()
                .map(|value| Predicate::field_equals(field, value))
                .collect(),
        )
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::FieldEqualsParam { field, param } => {
                write!(f, "{} === {}", FieldRef::new(field.as_str()), param)
            }
            Predicate::FieldEquals { field, value } => {
                write!(f, "{} === {}", FieldRef::new(field.as_str()), value)
            }
            Predicate::Any(inner) => {
                for (i, predicate) in inner.iter().enumerate() {
                    if i > 0 {
                        write!(f, " || ")?;
                    }
                    match predicate {
                        Predicate::Any(_) => write!(f, "({})", predicate)?,
                        _ => write!(f, "{}", predicate)?,
                    }
                }
                Ok(())
            }
        }
    }
}

impl Serialize for Predicate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Reference to a field of the current datum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef(pub String);

impl FieldRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    fn is_identifier(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if Self::is_identifier(&self.0) {
            write!(f, "datum.{}", self.0)
        } else {
            write!(f, "datum[{}]", Literal::Text(self.0.clone()))
        }
    }
}

/// Expression of a calculate transform
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `left - right`
    Difference(FieldRef, FieldRef),
}

impl Expr {
    pub fn difference(left: impl Into<String>, right: impl Into<String>) -> Self {
        Expr::Difference(FieldRef::new(left), FieldRef::new(right))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Difference(left, right) => write!(f, "{} - {}", left, right),
        }
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
