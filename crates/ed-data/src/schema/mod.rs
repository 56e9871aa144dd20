//! Column checks for the energy data set
//!
//! Rendering never validates the data; these checks back the `check` and
//! `preview` commands only.

use arrow::array::{Array, StringArray};
use arrow::datatypes::{DataType, Schema};
use arrow::record_batch::RecordBatch;
use indexmap::IndexSet;

use crate::DataError;

/// What a column has to hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Categorical,
    Integer,
    Numeric,
}

impl ColumnKind {
    pub fn accepts(&self, data_type: &DataType) -> bool {
        match self {
            ColumnKind::Categorical => matches!(data_type, DataType::Utf8 | DataType::LargeUtf8),
            ColumnKind::Integer => data_type.is_integer(),
            ColumnKind::Numeric => data_type.is_integer() || data_type.is_floating(),
        }
    }
}

/// Columns every chart relies on
pub const ENERGY_COLUMNS: [(&str, ColumnKind); 5] = [
    ("country", ColumnKind::Categorical),
    ("year", ColumnKind::Integer),
    ("renewables_share", ColumnKind::Numeric),
    ("co2_per_capita", ColumnKind::Numeric),
    ("energy_price_index", ColumnKind::Numeric),
];

/// Result of checking a schema against the expected columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaCheck {
    pub missing: Vec<String>,
    pub mistyped: Vec<(String, DataType)>,
}

impl SchemaCheck {
    pub fn run(schema: &Schema) -> Self {
        let mut check = Self::default();
        for (name, kind) in ENERGY_COLUMNS {
            match schema.field_with_name(name) {
                Ok(field) if kind.accepts(field.data_type()) => {}
                Ok(field) => check.mistyped.push((name.to_string(), field.data_type().clone())),
                Err(_) => check.missing.push(name.to_string()),
            }
        }
        check
    }

    pub fn is_ok(&self) -> bool {
        self.missing.is_empty() && self.mistyped.is_empty()
    }

    pub fn into_result(self) -> Result<(), DataError> {
        if self.is_ok() {
            return Ok(());
        }
        let mut problems = Vec::new();
        if !self.missing.is_empty() {
            problems.push(format!("missing columns: {}", self.missing.join(", ")));
        }
        for (name, data_type) in &self.mistyped {
            problems.push(format!("column {} has type {}", name, data_type));
        }
        Err(DataError::Schema(problems.join("; ")))
    }
}

/// Distinct non-null values of a text column, in first-seen order
pub fn distinct_text(batch: &RecordBatch, column: &str) -> Result<Vec<String>, DataError> {
    let array = batch
        .column_by_name(column)
        .ok_or_else(|| DataError::MissingColumn(column.to_string()))?;
    let strings = array
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| DataError::UnsupportedType {
            column: column.to_string(),
            data_type: array.data_type().clone(),
        })?;

    let values: IndexSet<&str> = strings.iter().flatten().collect();
    Ok(values.into_iter().map(|v| v.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CsvSource, NullConfig};

    fn load(text: &str) -> CsvSource {
        CsvSource::from_reader("test.csv", text.as_bytes(), &NullConfig::default()).unwrap()
    }

    #[test]
    fn test_complete_schema_passes() {
        let source = load(
            "country,year,renewables_share,co2_per_capita,energy_price_index\nSweden,2010,45,5.6,100\n",
        );
        assert!(SchemaCheck::run(&source.schema).into_result().is_ok());
    }

    #[test]
    fn test_reports_missing_and_mistyped() {
        let source = load("country,year,renewables_share\nSweden,twenty-ten,45\n");
        let check = SchemaCheck::run(&source.schema);
        assert_eq!(check.missing, vec!["co2_per_capita", "energy_price_index"]);
        assert_eq!(check.mistyped, vec![("year".to_string(), DataType::Utf8)]);
        assert!(matches!(check.into_result(), Err(DataError::Schema(_))));
    }

    #[test]
    fn test_distinct_text_keeps_order() {
        let source = load("country,year\nSweden,2010\nGermany,2010\nSweden,2024\n");
        assert_eq!(distinct_text(source.batch(), "country").unwrap(), vec!["Sweden", "Germany"]);
    }
}
