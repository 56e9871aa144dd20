use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::*;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use csv::ReaderBuilder;
use tracing::{debug, info};

use crate::config::NullConfig;
use crate::DataError;

/// CSV data source holding the whole file as one record batch
///
/// The dashboard's data set is a few hundred rows at most, so the file is
/// read once and kept in memory.
pub struct CsvSource {
    /// Display name, usually the file name
    name: String,
    /// Schema of the CSV file
    pub schema: Arc<Schema>,
    /// All rows
    batch: RecordBatch,
}

impl CsvSource {
    /// Create a new CSV source from a file path
    pub async fn new(path: PathBuf) -> Result<Self, DataError> {
        Self::with_null_config(path, NullConfig::default()).await
    }

    pub async fn with_null_config(path: PathBuf, null_config: NullConfig) -> Result<Self, DataError> {
        let source = tokio::task::spawn_blocking(move || {
            let file = File::open(&path)?;
            Self::from_reader(&Self::display_name(&path), BufReader::new(file), &null_config)
        })
        .await??;

        info!(
            "Loaded {} rows, {} columns from {}",
            source.batch.num_rows(),
            source.schema.fields().len(),
            source.name
        );
        Ok(source)
    }

    /// Read CSV text from any reader
    pub fn from_reader<R: Read>(name: &str, reader: R, null_config: &NullConfig) -> Result<Self, DataError> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            rows.push(record.iter().map(|s| s.to_string()).collect::<Vec<_>>());
        }

        let fields = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let data_type = Self::detect_column_type(&rows, idx, null_config);
                debug!("Column {} detected as {:?}", name, data_type);
                Field::new(name, data_type, true)
            })
            .collect::<Vec<_>>();
        let schema = Arc::new(Schema::new(fields));

        let batch = Self::build_batch(schema.clone(), &rows, null_config)?;

        Ok(Self {
            name: name.to_string(),
            schema,
            batch,
        })
    }

    fn display_name(path: &Path) -> String {
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown.csv")
            .to_string()
    }

    /// Detect column type from the non-null cells
    fn detect_column_type(rows: &[Vec<String>], col_idx: usize, null_config: &NullConfig) -> DataType {
        let mut seen = false;
        let mut is_int = true;
        let mut is_float = true;
        let mut is_bool = true;

        for row in rows {
            let Some(value) = row.get(col_idx).and_then(|v| null_config.clean(v)) else {
                continue;
            };
            seen = true;

            if is_int && value.parse::<i64>().is_err() {
                is_int = false;
            }
            if is_float && value.parse::<f64>().is_err() {
                is_float = false;
            }
            if is_bool && !matches!(value.to_lowercase().as_str(), "true" | "false") {
                is_bool = false;
            }
        }

        if !seen {
            DataType::Utf8
        } else if is_bool {
            DataType::Boolean
        } else if is_int {
            DataType::Int64
        } else if is_float {
            DataType::Float64
        } else {
            DataType::Utf8
        }
    }

    /// Build arrow arrays for each column
    fn build_batch(schema: Arc<Schema>, rows: &[Vec<String>], null_config: &NullConfig) -> Result<RecordBatch, DataError> {
        let cell = |row: &Vec<String>, col_idx: usize| -> Option<String> {
            row.get(col_idx)
                .and_then(|v| null_config.clean(v))
                .map(|v| v.to_string())
        };

        let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());
        for (col_idx, field) in schema.fields().iter().enumerate() {
            let array: ArrayRef = match field.data_type() {
                DataType::Int64 => {
                    let mut builder = Int64Builder::with_capacity(rows.len());
                    for row in rows {
                        builder.append_option(cell(row, col_idx).and_then(|v| v.parse::<i64>().ok()));
                    }
                    Arc::new(builder.finish())
                }
                DataType::Float64 => {
                    let mut builder = Float64Builder::with_capacity(rows.len());
                    for row in rows {
                        builder.append_option(cell(row, col_idx).and_then(|v| v.parse::<f64>().ok()));
                    }
                    Arc::new(builder.finish())
                }
                DataType::Boolean => {
                    let mut builder = BooleanBuilder::with_capacity(rows.len());
                    for row in rows {
                        builder.append_option(
                            cell(row, col_idx).and_then(|v| v.to_lowercase().parse::<bool>().ok()),
                        );
                    }
                    Arc::new(builder.finish())
                }
                _ => {
                    let mut builder = StringBuilder::new();
                    for row in rows {
                        builder.append_option(cell(row, col_idx));
                    }
                    Arc::new(builder.finish())
                }
            };

            columns.push(array);
        }

        RecordBatch::try_new(schema, columns).map_err(|e| e.into())
    }

    /// All rows
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }
}

#[async_trait]
impl ed_core::data::DataSource for CsvSource {
    async fn schema(&self) -> Arc<Schema> {
        self.schema.clone()
    }

    async fn query_all(&self) -> anyhow::Result<RecordBatch> {
        Ok(self.batch.clone())
    }

    async fn row_count(&self) -> anyhow::Result<usize> {
        Ok(self.batch.num_rows())
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}
