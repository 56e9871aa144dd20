//! Core functionality for the energy dashboard
//!
//! This crate provides the declarative chart model shared by every other
//! crate: descriptors, encodings, bound parameters, transforms and the
//! embedding options handed to the rendering collaborator.

pub mod config;
pub mod descriptor;
pub mod embed;
pub mod encoding;
pub mod literal;
pub mod mount;
pub mod params;
pub mod transform;

use thiserror::Error;

// Re-export commonly used types
pub use config::{ConfigError, DashboardConfig, Locale, MountPoints};
pub use descriptor::{ChartDescriptor, ChartKind, DataRef, Mark, MarkType, ViewConfig, Width};
pub use embed::{Actions, EmbedOptions, RendererMode};
pub use encoding::{Channel, ConditionalValue, Encoding, FieldDef, FieldType, ParamCondition, Scale, Sort};
pub use literal::Literal;
pub use mount::MountId;
pub use params::{Binding, InputBinding, Param, ParamBindings, Selection, SelectionType};
pub use transform::{Expr, FieldRef, Predicate, Transform};
pub use data::DataSource;

/// Vega-Lite schema every descriptor declares
pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

/// Errors raised while building or binding chart descriptors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("unknown parameter: {0}")]
    UnknownParam(String),

    #[error("parameter {name} has no value bound")]
    UnboundParam { name: String },

    #[error("value {value} is not accepted by parameter {name}")]
    InvalidParamValue { name: String, value: String },

    #[error("unknown chart: {0}")]
    UnknownChart(String),
}

pub mod data {
    use std::sync::Arc;

    /// Trait for tabular data sources feeding the charts
    #[async_trait::async_trait]
    pub trait DataSource: Send + Sync {
        /// Get the schema of this data source
        async fn schema(&self) -> Arc<arrow::datatypes::Schema>;

        /// Query every row
        async fn query_all(&self) -> anyhow::Result<arrow::record_batch::RecordBatch>;

        /// Get total row count
        async fn row_count(&self) -> anyhow::Result<usize>;

        /// Get the source name/path
        fn source_name(&self) -> &str;
    }
}
