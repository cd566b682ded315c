//! Flattening of Arrow record batches into string Records.
//!
//! Nulls become empty strings; the database layer parses the strings back to
//! typed values from the target schema. Only the column types the loaders
//! actually meet are handled: integers, floats, utf8, booleans, dates, and
//! timestamps.

use anyhow::{Context, Result, bail};
use arrow::array::{Array, as_boolean_array, as_primitive_array, as_string_array};
use arrow::datatypes::{
    ArrowPrimitiveType, DataType, Date32Type, Float32Type, Float64Type, Int32Type, Int64Type,
    TimeUnit, TimestampMicrosecondType, TimestampMillisecondType, TimestampNanosecondType,
    TimestampSecondType,
};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};

use crate::formats::Record;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const SECONDS_PER_DAY: i64 = 86_400;

/// Convert a columnar batch into row-ordered Records.
pub fn record_batch_to_records(batch: &RecordBatch) -> Result<Vec<Record>> {
    let columns: Vec<Vec<String>> = batch
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, array)| {
            column_to_strings(array.as_ref()).with_context(|| {
                format!(
                    "Failed to convert column {} ({:?})",
                    idx,
                    array.data_type()
                )
            })
        })
        .collect::<Result<_>>()?;

    let mut records = Vec::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        records.push(Record {
            fields: columns.iter().map(|column| column[row].clone()).collect(),
        });
    }

    Ok(records)
}

fn column_to_strings(array: &dyn Array) -> Result<Vec<String>> {
    Ok(match array.data_type() {
        DataType::Boolean => as_boolean_array(array)
            .iter()
            .map(|v| v.map(|b| b.to_string()).unwrap_or_default())
            .collect(),
        DataType::Int32 => primitive_strings::<Int32Type>(array),
        DataType::Int64 => primitive_strings::<Int64Type>(array),
        DataType::Float32 => primitive_strings::<Float32Type>(array),
        DataType::Float64 => primitive_strings::<Float64Type>(array),
        DataType::Utf8 => as_string_array(array)
            .iter()
            .map(|v| v.map(str::to_string).unwrap_or_default())
            .collect(),
        DataType::Date32 => as_primitive_array::<Date32Type>(array)
            .iter()
            .map(|v| match v {
                Some(days) => {
                    let datetime = DateTime::from_timestamp(days as i64 * SECONDS_PER_DAY, 0)
                        .with_context(|| format!("Date out of range: {} days", days))?;
                    Ok(datetime.format("%Y-%m-%d").to_string())
                }
                None => Ok(String::new()),
            })
            .collect::<Result<_>>()?,
        DataType::Timestamp(unit, _) => timestamp_strings(array, unit)?,
        other => bail!("Unsupported Parquet column type: {:?}", other),
    })
}

fn primitive_strings<T>(array: &dyn Array) -> Vec<String>
where
    T: ArrowPrimitiveType,
    T::Native: std::fmt::Display,
{
    as_primitive_array::<T>(array)
        .iter()
        .map(|v| v.map(|value| value.to_string()).unwrap_or_default())
        .collect()
}

/// Format a timestamp column regardless of its stored resolution.
fn timestamp_strings(array: &dyn Array, unit: &TimeUnit) -> Result<Vec<String>> {
    let raw: Vec<Option<i64>> = match unit {
        TimeUnit::Second => as_primitive_array::<TimestampSecondType>(array).iter().collect(),
        TimeUnit::Millisecond => as_primitive_array::<TimestampMillisecondType>(array)
            .iter()
            .collect(),
        TimeUnit::Microsecond => as_primitive_array::<TimestampMicrosecondType>(array)
            .iter()
            .collect(),
        TimeUnit::Nanosecond => as_primitive_array::<TimestampNanosecondType>(array)
            .iter()
            .collect(),
    };

    let to_datetime = |value: i64| -> Option<DateTime<Utc>> {
        match unit {
            TimeUnit::Second => DateTime::from_timestamp(value, 0),
            TimeUnit::Millisecond => DateTime::from_timestamp_millis(value),
            TimeUnit::Microsecond => DateTime::from_timestamp_micros(value),
            TimeUnit::Nanosecond => Some(DateTime::from_timestamp_nanos(value)),
        }
    };

    raw.into_iter()
        .map(|v| match v {
            Some(value) => {
                let datetime = to_datetime(value)
                    .with_context(|| format!("Timestamp out of range: {}", value))?;
                Ok(datetime.format(TIMESTAMP_FORMAT).to_string())
            }
            None => Ok(String::new()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{
        Date32Array, Float64Array, Int64Array, LargeStringArray, StringArray,
        TimestampMillisecondArray, TimestampSecondArray,
    };
    use arrow::datatypes::{Field, Schema};
    use std::sync::Arc;

    #[test]
    fn test_integers_and_floats() {
        let schema = Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("value", DataType::Float64, false),
        ]);

        let ids = Int64Array::from(vec![1, 2, 3]);
        let values = Float64Array::from(vec![1.5, 2.0, 3.25]);

        let batch =
            RecordBatch::try_new(Arc::new(schema), vec![Arc::new(ids), Arc::new(values)]).unwrap();

        let records = record_batch_to_records(&batch).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].fields, vec!["1", "1.5"]);
        assert_eq!(records[1].fields, vec!["2", "2"]);
        assert_eq!(records[2].fields, vec!["3", "3.25"]);
    }

    #[test]
    fn test_nulls_become_empty_strings() {
        let schema = Schema::new(vec![Field::new("name", DataType::Utf8, true)]);
        let names = StringArray::from(vec![Some("Alice"), None, Some("Bob")]);

        let batch = RecordBatch::try_new(Arc::new(schema), vec![Arc::new(names)]).unwrap();
        let records = record_batch_to_records(&batch).unwrap();

        assert_eq!(records[0].fields, vec!["Alice"]);
        assert_eq!(records[1].fields, vec![""]);
        assert_eq!(records[2].fields, vec!["Bob"]);
    }

    #[test]
    fn test_dates() {
        let schema = Schema::new(vec![Field::new("date", DataType::Date32, false)]);

        // Days since epoch: 0 = 1970-01-01, 18993 = 2022-01-01
        let dates = Date32Array::from(vec![0, 18993]);

        let batch = RecordBatch::try_new(Arc::new(schema), vec![Arc::new(dates)]).unwrap();
        let records = record_batch_to_records(&batch).unwrap();

        assert_eq!(records[0].fields, vec!["1970-01-01"]);
        assert_eq!(records[1].fields, vec!["2022-01-01"]);
    }

    #[test]
    fn test_timestamp_units_share_formatting() {
        // 2021-01-01 00:00:00 UTC in seconds and milliseconds
        let seconds = TimestampSecondArray::from(vec![1609459200]);
        let millis = TimestampMillisecondArray::from(vec![1609459200000]);

        let schema = Schema::new(vec![
            Field::new("s", DataType::Timestamp(TimeUnit::Second, None), false),
            Field::new("ms", DataType::Timestamp(TimeUnit::Millisecond, None), false),
        ]);

        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![Arc::new(seconds), Arc::new(millis)],
        )
        .unwrap();
        let records = record_batch_to_records(&batch).unwrap();

        assert_eq!(
            records[0].fields,
            vec!["2021-01-01 00:00:00", "2021-01-01 00:00:00"]
        );
    }

    #[test]
    fn test_empty_batch() {
        let schema = Schema::new(vec![Field::new("id", DataType::Int64, false)]);
        let ids = Int64Array::from(Vec::<i64>::new());

        let batch = RecordBatch::try_new(Arc::new(schema), vec![Arc::new(ids)]).unwrap();
        let records = record_batch_to_records(&batch).unwrap();

        assert!(records.is_empty());
    }

    #[test]
    fn test_unhandled_column_type_is_an_error() {
        let schema = Schema::new(vec![Field::new("blob", DataType::LargeUtf8, false)]);
        let values = LargeStringArray::from(vec!["x"]);

        let batch = RecordBatch::try_new(Arc::new(schema), vec![Arc::new(values)]).unwrap();
        let err = record_batch_to_records(&batch).unwrap_err();

        assert!(format!("{:?}", err).contains("Unsupported Parquet column type"));
    }
}
