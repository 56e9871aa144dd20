//! Interactive parameters bound to UI controls

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::literal::Literal;
use crate::ChartError;

/// A named parameter, either a plain value driven by an input widget or a
/// selection driven by clicks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Literal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<Selection>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<Binding>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    #[serde(rename = "type")]
    pub kind: SelectionType,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionType {
    Point,
}

/// Where a parameter gets its value from
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Input(InputBinding),
    /// Clicking a legend entry toggles the selection
    Legend,
}

impl Serialize for Binding {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Binding::Input(input) => input.serialize(serializer),
            Binding::Legend => serializer.serialize_str("legend"),
        }
    }
}

/// HTML input widget bound to a parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "input", rename_all = "lowercase")]
pub enum InputBinding {
    Select {
        options: Vec<Literal>,
        name: String,
    },
    Range {
        min: i64,
        max: i64,
        step: i64,
        name: String,
    },
}

impl Param {
    /// Dropdown over a fixed set of options
    pub fn select_input(
        name: impl Into<String>,
        default: impl Into<Literal>,
        options: Vec<Literal>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: Some(default.into()),
            select: None,
            bind: Some(Binding::Input(InputBinding::Select {
                options,
                name: label.into(),
            })),
        }
    }

    /// Slider over an integer range
    pub fn range_input(
        name: impl Into<String>,
        default: i64,
        (min, max, step): (i64, i64, i64),
        label: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: Some(Literal::Int(default)),
            select: None,
            bind: Some(Binding::Input(InputBinding::Range {
                min,
                max,
                step,
                name: label.into(),
            })),
        }
    }

    /// Point selection over `fields`, toggled through the legend
    pub fn legend_point(name: impl Into<String>, fields: &[&str]) -> Self {
        Self {
            name: name.into(),
            value: None,
            select: Some(Selection {
                kind: SelectionType::Point,
                fields: fields.iter().map(|f| f.to_string()).collect(),
            }),
            bind: Some(Binding::Legend),
        }
    }

    pub fn is_selection(&self) -> bool {
        self.select.is_some()
    }

    /// Whether the bound widget could produce `value`
    pub fn accepts(&self, value: &Literal) -> bool {
        if self.is_selection() {
            return false;
        }
        match &self.bind {
            Some(Binding::Input(InputBinding::Select { options, .. })) => {
                options.iter().any(|option| option.strict_eq(value))
            }
            Some(Binding::Input(InputBinding::Range { min, max, step, .. })) => {
                match value.as_f64() {
                    Some(v) if v >= *min as f64 && v <= *max as f64 => {
                        *step <= 0 || ((v - *min as f64) / *step as f64).fract() == 0.0
                    }
                    _ => false,
                }
            }
            Some(Binding::Legend) => false,
            None => true,
        }
    }
}

/// Current values of the value parameters of one chart
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamBindings {
    values: IndexMap<String, Literal>,
}

impl ParamBindings {
    /// Bindings holding every parameter's default value
    pub fn defaults(params: &[Param]) -> Self {
        let values = params
            .iter()
            .filter_map(|p| p.value.clone().map(|v| (p.name.clone(), v)))
            .collect();
        Self { values }
    }

    /// Bind `name` to `value` after checking the widget could produce it
    pub fn bind(&mut self, params: &[Param], name: &str, value: Literal) -> Result<(), ChartError> {
        let param = params
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ChartError::UnknownParam(name.to_string()))?;

        if !param.accepts(&value) {
            return Err(ChartError::InvalidParamValue {
                name: name.to_string(),
                value: value.key(),
            });
        }

        self.values.insert(name.to_string(), value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Literal> {
        self.values.get(name)
    }

    pub fn require(&self, name: &str) -> Result<&Literal, ChartError> {
        self.get(name).ok_or_else(|| ChartError::UnboundParam {
            name: name.to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Literal)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}
