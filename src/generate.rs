//! Synthetic two-column dataset generator.

use anyhow::{Context, Result};
use arrow::array::Int64Array;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Build the fixed sample batch: A = [1, 2], B = [3, 4], day repeated per row.
pub fn sample_batch(day: i64) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("A", DataType::Int64, false),
        Field::new("B", DataType::Int64, false),
        Field::new("day", DataType::Int64, false),
    ]));

    let a = Int64Array::from(vec![1, 2]);
    let b = Int64Array::from(vec![3, 4]);
    let day_column = Int64Array::from(vec![day, day]);

    RecordBatch::try_new(schema, vec![Arc::new(a), Arc::new(b), Arc::new(day_column)])
        .context("Failed to build sample record batch")
}

/// Write the sample dataset for `day` into `dir`, returning the output path
/// `<dir>/output_day_<day>.parquet`.
pub fn write_sample_file(day: i64, dir: &Path) -> Result<PathBuf> {
    let batch = sample_batch(day)?;
    let path = dir.join(format!("output_day_{}.parquet", day));

    let file = File::create(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)
        .context("Failed to create parquet writer")?;
    writer.write(&batch).context("Failed to write sample batch")?;
    writer.close().context("Failed to finalize parquet file")?;

    Ok(path)
}
