//! Encoding channels mapping data fields onto visual properties

use std::fmt;

use serde::{Serialize, Serializer};

use crate::literal::Literal;

/// Measurement type of an encoded field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Quantitative,
    Ordinal,
    Nominal,
}

/// Visual channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    X,
    Y,
    Color,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::X => "x",
            Channel::Y => "y",
            Channel::Color => "color",
        };
        f.write_str(name)
    }
}

/// Sort order of a discrete axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
    /// Order by the values encoded on another channel, e.g. `-x`
    ByChannel { channel: Channel, descending: bool },
}

impl Serialize for Sort {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Sort::ByChannel { channel, descending } => {
                let prefix = if *descending { "-" } else { "" };
                serializer.serialize_str(&format!("{}{}", prefix, channel))
            }
        }
    }
}

/// Scale overrides for a channel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scale {
    pub domain: Vec<Literal>,
}

impl Scale {
    pub fn domain(min: impl Into<Literal>, max: impl Into<Literal>) -> Self {
        Self {
            domain: vec![min.into(), max.into()],
        }
    }
}

/// A field bound to a channel, or an entry of the tooltip list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDef {
    pub field: String,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<Scale>,
}

impl FieldDef {
    pub fn new(field: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            field: field.into(),
            field_type: Some(field_type),
            sort: None,
            title: None,
            scale: None,
        }
    }

    /// Untyped field, as used in tooltip lists
    pub fn tooltip(field: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            field_type: None,
            sort: None,
            title: Some(title.into()),
            scale: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn scale(mut self, scale: Scale) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }
}

/// A value chosen by whether a selection parameter contains the datum
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionalValue {
    pub condition: ParamCondition,
    pub value: Literal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamCondition {
    pub param: String,
    pub value: Literal,
}

impl ConditionalValue {
    pub fn when_selected(
        param: impl Into<String>,
        selected: impl Into<Literal>,
        otherwise: impl Into<Literal>,
    ) -> Self {
        Self {
            condition: ParamCondition {
                param: param.into(),
                value: selected.into(),
            },
            value: otherwise.into(),
        }
    }
}

/// Channel mapping of one chart
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Encoding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<FieldDef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<FieldDef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<FieldDef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<ConditionalValue>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tooltip: Vec<FieldDef>,
}

impl Encoding {
    /// Field definition bound to a positional or color channel
    pub fn channel(&self, channel: Channel) -> Option<&FieldDef> {
        match channel {
            Channel::X => self.x.as_ref(),
            Channel::Y => self.y.as_ref(),
            Channel::Color => self.color.as_ref(),
        }
    }

    /// Field the rows are ordered by and whether the order is descending
    pub fn sort_key(&self) -> Option<(&str, bool)> {
        [&self.x, &self.y, &self.color]
            .into_iter()
            .flatten()
            .find_map(|def| match def.sort {
                Some(Sort::ByChannel { channel, descending }) => self
                    .channel(channel)
                    .map(|target| (target.field.as_str(), descending)),
                None => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sort_by_channel_wire_form() {
        let def = FieldDef::new("country", FieldType::Nominal).sort(Sort::ByChannel {
            channel: Channel::X,
            descending: true,
        });
        assert_eq!(
            serde_json::to_value(&def).unwrap(),
            json!({ "field": "country", "type": "nominal", "sort": "-x" })
        );
    }

    #[test]
    fn test_sort_key_resolves_referenced_channel() {
        let encoding = Encoding {
            y: Some(FieldDef::new("country", FieldType::Nominal).sort(Sort::ByChannel {
                channel: Channel::X,
                descending: true,
            })),
            x: Some(FieldDef::new("delta", FieldType::Quantitative)),
            ..Default::default()
        };
        assert_eq!(encoding.sort_key(), Some(("delta", true)));
    }
}
