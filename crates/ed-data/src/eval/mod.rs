//! Local evaluation of chart transforms
//!
//! Applies filter, pivot and calculate steps to a record batch, then orders
//! the rows by the encoding sort, to preview what a chart will show.
//! Missing values propagate: a pivot cell with no source row is null (Vega's
//! summing pivot would show 0 there), and arithmetic over a null operand
//! yields null.

use std::cmp::Ordering;
use std::sync::Arc;

use ahash::AHashMap;
use arrow::array::*;
use arrow::compute::{filter_record_batch, sort_to_indices, take, SortOptions};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use ed_core::{ChartDescriptor, Expr, Literal, ParamBindings, Predicate, Transform};
use indexmap::IndexMap;
use tracing::debug;

use crate::DataError;

/// Rows `descriptor` would display for the given parameter values
pub fn preview(descriptor: &ChartDescriptor, batch: &RecordBatch, bindings: &ParamBindings) -> Result<RecordBatch, DataError> {
    let transformed = apply(batch, &descriptor.transforms, bindings)?;
    match descriptor.encoding.sort_key() {
        Some((field, descending)) => sort_by(&transformed, field, descending),
        None => Ok(transformed),
    }
}

/// Run a transform pipeline in order
pub fn apply(batch: &RecordBatch, transforms: &[Transform], bindings: &ParamBindings) -> Result<RecordBatch, DataError> {
    let mut current = batch.clone();
    for transform in transforms {
        current = match transform {
            Transform::Filter { filter: predicate } => filter(&current, predicate, bindings)?,
            Transform::Pivot { pivot: key, value, groupby } => pivot(&current, key, value, groupby)?,
            Transform::Calculate { calculate: expr, as_field } => calculate(&current, expr, as_field)?,
        };
        debug!("{} rows after {:?}", current.num_rows(), transform);
    }
    Ok(current)
}

/// Keep the rows matching `predicate`
pub fn filter(batch: &RecordBatch, predicate: &Predicate, bindings: &ParamBindings) -> Result<RecordBatch, DataError> {
    let mut mask = BooleanBuilder::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        mask.append_value(matches(batch, predicate, bindings, row)?);
    }
    Ok(filter_record_batch(batch, &mask.finish())?)
}

fn matches(batch: &RecordBatch, predicate: &Predicate, bindings: &ParamBindings, row: usize) -> Result<bool, DataError> {
    match predicate {
        Predicate::FieldEqualsParam { field, param } => {
            let expected = bindings.require(param)?;
            let cell = literal_at(column(batch, field)?, field, row)?;
            Ok(cell.is_some_and(|v| v.strict_eq(expected)))
        }
        Predicate::FieldEquals { field, value } => {
            let cell = literal_at(column(batch, field)?, field, row)?;
            Ok(cell.is_some_and(|v| v.strict_eq(value)))
        }
        Predicate::Any(inner) => {
            for predicate in inner {
                if matches(batch, predicate, bindings, row)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }
}

/// Spread `value` into one column per distinct `key`, one row per group
///
/// Duplicate cells are summed. Pivot columns are ordered by key value.
pub fn pivot(batch: &RecordBatch, key: &str, value: &str, groupby: &[String]) -> Result<RecordBatch, DataError> {
    let key_col = column(batch, key)?;
    let value_col = column(batch, value)?;
    let group_cols = groupby
        .iter()
        .map(|g| column(batch, g).map(|c| (g.as_str(), c)))
        .collect::<Result<Vec<_>, _>>()?;

    // group key -> (first row, pivot key -> summed value)
    let mut groups: IndexMap<Vec<String>, (u32, AHashMap<String, f64>)> = IndexMap::new();
    let mut pivot_keys: Vec<Literal> = Vec::new();

    for row in 0..batch.num_rows() {
        let Some(pivot_value) = literal_at(key_col, key, row)? else {
            continue;
        };
        let pivot_key = pivot_value.key();
        if !pivot_keys.iter().any(|k| k.key() == pivot_key) {
            pivot_keys.push(pivot_value);
        }

        let mut group_key = Vec::with_capacity(group_cols.len());
        for &(name, col) in &group_cols {
            group_key.push(literal_at(col, name, row)?.map(|v| v.key()).unwrap_or_default());
        }

        let (_, cells) = groups
            .entry(group_key)
            .or_insert_with(|| (row as u32, AHashMap::new()));
        if let Some(v) = numeric_at(value_col, value, row)? {
            *cells.entry(pivot_key).or_insert(0.0) += v;
        }
    }

    pivot_keys.sort_by(compare_literals);

    let first_rows = UInt32Array::from(groups.values().map(|(row, _)| *row).collect::<Vec<_>>());
    let mut fields = Vec::with_capacity(group_cols.len() + pivot_keys.len());
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(fields.capacity());

    for &(name, col) in &group_cols {
        fields.push(batch.schema().field_with_name(name)?.clone());
        columns.push(take(col.as_ref(), &first_rows, None)?);
    }
    for pivot_key in &pivot_keys {
        let name = pivot_key.key();
        let values: Float64Array = groups
            .values()
            .map(|(_, cells)| cells.get(&name).copied())
            .collect();
        fields.push(Field::new(name, DataType::Float64, true));
        columns.push(Arc::new(values));
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

/// Add (or replace) `as_field` holding `expr` evaluated per row
pub fn calculate(batch: &RecordBatch, expr: &Expr, as_field: &str) -> Result<RecordBatch, DataError> {
    let values: Float64Array = match expr {
        Expr::Difference(left, right) => {
            let left_col = column(batch, left.name())?;
            let right_col = column(batch, right.name())?;
            (0..batch.num_rows())
                .map(|row| -> Result<Option<f64>, DataError> {
                    let l = numeric_at(left_col, left.name(), row)?;
                    let r = numeric_at(right_col, right.name(), row)?;
                    Ok(l.zip(r).map(|(l, r)| l - r))
                })
                .collect::<Result<Vec<_>, _>>()?
                .into_iter()
                .collect()
        }
    };

    let schema = batch.schema();
    let mut fields: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
    let mut columns = batch.columns().to_vec();
    let derived = Field::new(as_field, DataType::Float64, true);

    match fields.iter().position(|f| f.name() == as_field) {
        Some(idx) => {
            fields[idx] = derived;
            columns[idx] = Arc::new(values);
        }
        None => {
            fields.push(derived);
            columns.push(Arc::new(values));
        }
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

/// Order rows by `field`, nulls last
pub fn sort_by(batch: &RecordBatch, field: &str, descending: bool) -> Result<RecordBatch, DataError> {
    let options = SortOptions {
        descending,
        nulls_first: false,
    };
    let indices = sort_to_indices(column(batch, field)?.as_ref(), Some(options), None)?;
    let columns = batch
        .columns()
        .iter()
        .map(|c| take(c.as_ref(), &indices, None))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(RecordBatch::try_new(batch.schema(), columns)?)
}

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef, DataError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| DataError::MissingColumn(name.to_string()))
}

/// Cell value, `None` when null
pub fn literal_at(array: &ArrayRef, name: &str, row: usize) -> Result<Option<Literal>, DataError> {
    if array.is_null(row) {
        return Ok(None);
    }

    let unsupported = || DataError::UnsupportedType {
        column: name.to_string(),
        data_type: array.data_type().clone(),
    };

    let value = match array.data_type() {
        DataType::Int64 => Literal::Int(
            array.as_any().downcast_ref::<Int64Array>().ok_or_else(unsupported)?.value(row),
        ),
        DataType::Int32 => Literal::Int(
            array.as_any().downcast_ref::<Int32Array>().ok_or_else(unsupported)?.value(row) as i64,
        ),
        DataType::Float64 => Literal::Float(
            array.as_any().downcast_ref::<Float64Array>().ok_or_else(unsupported)?.value(row),
        ),
        DataType::Boolean => Literal::Bool(
            array.as_any().downcast_ref::<BooleanArray>().ok_or_else(unsupported)?.value(row),
        ),
        DataType::Utf8 => Literal::Text(
            array
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(unsupported)?
                .value(row)
                .to_string(),
        ),
        _ => return Err(unsupported()),
    };
    Ok(Some(value))
}

/// Numeric cell value, `None` when null or not a number
fn numeric_at(array: &ArrayRef, name: &str, row: usize) -> Result<Option<f64>, DataError> {
    Ok(literal_at(array, name, row)?.and_then(|v| v.as_f64()))
}

fn compare_literals(a: &Literal, b: &Literal) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.key().cmp(&b.key()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CsvSource, NullConfig};
    use ed_core::Param;

    const DATA: &str = "\
country,year,renewables_share,co2_per_capita,energy_price_index
Sweden,2010,45,5.6,100
Sweden,2015,53,4.8,104
Sweden,2024,68,3.4,121
Germany,2010,17,9.9,100
Germany,2024,52,7.1,158
Hungary,2010,8,5.0,100
";

    fn batch(text: &str) -> RecordBatch {
        CsvSource::from_reader("test.csv", text.as_bytes(), &NullConfig::default())
            .unwrap()
            .batch()
            .clone()
    }

    fn f64_column(batch: &RecordBatch, name: &str) -> Vec<Option<f64>> {
        batch
            .column_by_name(name)
            .unwrap()
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap()
            .iter()
            .collect()
    }

    fn text_column(batch: &RecordBatch, name: &str) -> Vec<String> {
        batch
            .column_by_name(name)
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap()
            .iter()
            .map(|v| v.unwrap_or_default().to_string())
            .collect()
    }

    fn delta_pipeline() -> Vec<Transform> {
        vec![
            Transform::filter(Predicate::field_in("year", [Literal::Int(2010), Literal::Int(2024)])),
            Transform::pivot("year", "renewables_share", &["country"]),
            Transform::calculate(Expr::difference("2024", "2010"), "delta"),
        ]
    }

    #[test]
    fn test_filter_by_param() {
        let params = vec![Param::select_input(
            "Country",
            "Sweden",
            vec!["Sweden".into(), "Germany".into()],
            "Country: ",
        )];
        let mut bindings = ParamBindings::defaults(&params);
        bindings.bind(&params, "Country", "Germany".into()).unwrap();

        let rows = filter(&batch(DATA), &Predicate::field_equals_param("country", "Country"), &bindings).unwrap();
        assert_eq!(text_column(&rows, "country"), vec!["Germany", "Germany"]);
    }

    #[test]
    fn test_filter_requires_bound_param() {
        let result = filter(
            &batch(DATA),
            &Predicate::field_equals_param("year", "Year"),
            &ParamBindings::default(),
        );
        assert!(matches!(result, Err(DataError::Chart(_))));
    }

    #[test]
    fn test_delta_for_two_rows() {
        let rows = batch("country,year,renewables_share\nSweden,2010,45\nSweden,2024,68\n");
        let out = apply(&rows, &delta_pipeline(), &ParamBindings::default()).unwrap();

        assert_eq!(out.num_rows(), 1);
        assert_eq!(text_column(&out, "country"), vec!["Sweden"]);
        assert_eq!(f64_column(&out, "2010"), vec![Some(45.0)]);
        assert_eq!(f64_column(&out, "delta"), vec![Some(23.0)]);
    }

    #[test]
    fn test_missing_year_yields_null_delta_sorted_last() {
        let out = apply(&batch(DATA), &delta_pipeline(), &ParamBindings::default()).unwrap();
        let sorted = sort_by(&out, "delta", true).unwrap();

        assert_eq!(text_column(&sorted, "country"), vec!["Germany", "Sweden", "Hungary"]);
        assert_eq!(f64_column(&sorted, "delta"), vec![Some(35.0), Some(23.0), None]);
        assert_eq!(f64_column(&sorted, "2024"), vec![Some(52.0), Some(68.0), None]);
    }

    #[test]
    fn test_pivot_orders_keys_numerically() {
        let rows = batch("country,year,v\nA,2024,1\nA,2010,2\nA,2015,3\n");
        let out = pivot(&rows, "year", "v", &["country".to_string()]).unwrap();
        let names: Vec<_> = out.schema().fields().iter().map(|f| f.name().clone()).collect();
        assert_eq!(names, vec!["country", "2010", "2015", "2024"]);
    }

    #[test]
    fn test_calculate_replaces_existing_field() {
        let rows = batch("a,b,delta\n5,2,0\n");
        let out = calculate(&rows, &Expr::difference("a", "b"), "delta").unwrap();
        assert_eq!(out.num_columns(), 3);
        assert_eq!(f64_column(&out, "delta"), vec![Some(3.0)]);
    }

    #[test]
    fn test_unknown_column_reported() {
        let result = pivot(&batch(DATA), "month", "renewables_share", &[]);
        assert!(matches!(result, Err(DataError::MissingColumn(name)) if name == "month"));
    }
}
