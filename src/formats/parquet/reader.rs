use anyhow::{Context, Result};
use arrow::datatypes::{DataType, SchemaRef};
use bytes::Bytes;
use parquet::arrow::arrow_reader::{ParquetRecordBatchReader, ParquetRecordBatchReaderBuilder};

use super::conversion::record_batch_to_records;
use crate::db::schema::{Column, Schema, SqlType};
use crate::formats::Record;

/// Reader over an in-memory Parquet file, yielding fixed row-count slices.
///
/// There is no streaming here: the caller hands over the complete file bytes
/// and the decoder is configured to emit batches of `chunk_size` rows.
pub struct ParquetSlices {
    schema: SchemaRef,
    total_rows: u64,
    reader: ParquetRecordBatchReader,
}

impl ParquetSlices {
    pub fn new(data: Bytes, chunk_size: usize) -> Result<Self> {
        let builder = ParquetRecordBatchReaderBuilder::try_new(data)
            .context("Failed to read Parquet metadata")?;

        let total_rows = builder.metadata().file_metadata().num_rows() as u64;
        let schema = builder.schema().clone();

        let reader = builder
            .with_batch_size(chunk_size)
            .build()
            .context("Failed to build Parquet reader")?;

        Ok(Self {
            schema,
            total_rows,
            reader,
        })
    }

    pub fn total_rows(&self) -> u64 {
        self.total_rows
    }

    /// Map the Arrow file schema onto the database column model.
    pub fn table_schema(&self) -> Schema {
        let columns = self
            .schema
            .fields()
            .iter()
            .map(|field| {
                let sql_type = match field.data_type() {
                    DataType::Boolean => SqlType::Boolean,
                    DataType::Int8
                    | DataType::Int16
                    | DataType::Int32
                    | DataType::Int64
                    | DataType::UInt8
                    | DataType::UInt16
                    | DataType::UInt32
                    | DataType::UInt64 => SqlType::BigInt,
                    DataType::Float32 | DataType::Float64 => SqlType::DoublePrecision,
                    DataType::Date32 | DataType::Date64 => SqlType::Date,
                    DataType::Timestamp(_, _) => SqlType::Timestamp,
                    _ => SqlType::Text,
                };

                Column {
                    name: field.name().clone(),
                    sql_type,
                    nullable: field.is_nullable(),
                }
            })
            .collect();

        Schema { columns }
    }

    /// Read the next slice of rows. Returns `None` when the file is exhausted.
    pub fn next_chunk(&mut self) -> Result<Option<Vec<Record>>> {
        match self.reader.next() {
            Some(batch) => {
                let batch = batch.context("Failed to decode Parquet batch")?;
                Ok(Some(record_batch_to_records(&batch)?))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::Field;
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use std::sync::Arc;

    fn test_parquet_bytes(num_rows: usize) -> Bytes {
        let schema = Arc::new(arrow::datatypes::Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("name", DataType::Utf8, true),
            Field::new("value", DataType::Float64, true),
        ]));

        let id = Int64Array::from_iter_values(0..num_rows as i64);
        let name =
            StringArray::from_iter_values((0..num_rows).map(|i| format!("name_{}", i)));
        let value = Float64Array::from_iter_values((0..num_rows).map(|i| i as f64 * 1.5));

        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![Arc::new(id), Arc::new(name), Arc::new(value)],
        )
        .unwrap();

        let mut buffer = Vec::new();
        let mut writer = ArrowWriter::try_new(&mut buffer, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        Bytes::from(buffer)
    }

    #[test]
    fn test_total_rows_and_schema() {
        let slices = ParquetSlices::new(test_parquet_bytes(50), 20).unwrap();
        assert_eq!(slices.total_rows(), 50);

        let schema = slices.table_schema();
        assert_eq!(schema.columns.len(), 3);
        assert_eq!(schema.columns[0].name, "id");
        assert_eq!(schema.columns[0].sql_type, SqlType::BigInt);
        assert!(!schema.columns[0].nullable);
        assert_eq!(schema.columns[1].sql_type, SqlType::Text);
        assert_eq!(schema.columns[2].sql_type, SqlType::DoublePrecision);
        assert!(schema.columns[2].nullable);
    }

    #[test]
    fn test_slices_respect_chunk_size() {
        let mut slices = ParquetSlices::new(test_parquet_bytes(50), 20).unwrap();

        let mut sizes = Vec::new();
        while let Some(chunk) = slices.next_chunk().unwrap() {
            sizes.push(chunk.len());
        }

        assert_eq!(sizes, vec![20, 20, 10]);
    }

    #[test]
    fn test_records_are_stringified() {
        let mut slices = ParquetSlices::new(test_parquet_bytes(3), 10).unwrap();
        let chunk = slices.next_chunk().unwrap().unwrap();

        assert_eq!(chunk[0].fields, vec!["0", "name_0", "0"]);
        assert_eq!(chunk[1].fields, vec!["1", "name_1", "1.5"]);
    }
}
