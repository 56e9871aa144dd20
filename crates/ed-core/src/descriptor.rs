//! Chart descriptors: immutable declarative specifications of one chart

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::encoding::Encoding;
use crate::mount::MountId;
use crate::params::Param;
use crate::transform::Transform;
use crate::ChartError;

/// The closed set of charts on the dashboard, in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    TimeSeriesLine,
    YearScatter,
    PriceHeatmap,
    DeltaBars,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::TimeSeriesLine,
        ChartKind::YearScatter,
        ChartKind::PriceHeatmap,
        ChartKind::DeltaBars,
    ];

    /// Short name used on the command line
    pub fn name(&self) -> &'static str {
        match self {
            ChartKind::TimeSeriesLine => "line",
            ChartKind::YearScatter => "scatter",
            ChartKind::PriceHeatmap => "heatmap",
            ChartKind::DeltaBars => "bars",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChartKind {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ChartError::UnknownChart(s.to_string()))
    }
}

/// Location of the tabular data a chart reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataRef {
    pub url: String,
}

/// Chart width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// Fill the mount element
    Container,
    Pixels(u32),
}

impl Serialize for Width {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Width::Container => serializer.serialize_str("container"),
            Width::Pixels(px) => serializer.serialize_u32(*px),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkType {
    Line,
    Circle,
    Rect,
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub kind: MarkType,

    /// Overlay point markers on a line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl Mark {
    pub fn new(kind: MarkType) -> Self {
        Self {
            kind,
            point: None,
            size: None,
            opacity: None,
        }
    }

    pub fn with_points(mut self) -> Self {
        self.point = Some(true);
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewConfig {
    pub background: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            background: "transparent".to_string(),
        }
    }
}

/// Declarative specification of one chart
///
/// Serializes to the Vega-Lite document handed to the embed call. The
/// variant tag and mount target travel alongside and are not serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDescriptor {
    #[serde(skip)]
    pub kind: ChartKind,

    #[serde(skip)]
    pub target: MountId,

    #[serde(rename = "$schema")]
    pub schema: String,

    pub description: String,

    pub width: Width,

    pub height: u32,

    pub data: DataRef,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,

    #[serde(rename = "transform", skip_serializing_if = "Vec::is_empty")]
    pub transforms: Vec<Transform>,

    pub mark: Mark,

    pub encoding: Encoding,

    pub config: ViewConfig,
}

impl ChartDescriptor {
    /// Vega-Lite document as a JSON value
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
