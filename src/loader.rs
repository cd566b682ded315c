//! Generic replace-then-append table loader.

use anyhow::{Context, Result};
use tracing::info;

use crate::db::{Db, infer_schema};
use crate::formats::csv::CsvChunks;
use crate::formats::parquet::ParquetSlices;
use crate::formats::{self, FileKind};
use crate::io::Source;
use crate::progress;

/// Summary of a completed load.
#[derive(Debug)]
pub struct LoadSummary {
    /// Chunk-level insert operations issued, ceil(rows / chunk_size).
    pub chunks: usize,
    /// Total rows inserted.
    pub rows: u64,
}

/// Load a CSV or Parquet source into `table`, replacing the table on the
/// first chunk and appending thereafter.
pub async fn load_table(
    db: &Db,
    source: &Source,
    table: &str,
    chunk_size: usize,
) -> Result<LoadSummary> {
    let name = source.file_name();
    let kind = formats::detect(&name)?;

    info!("Reading from: {}", name);
    info!("Target table: {}", table);

    match kind {
        FileKind::Csv => load_csv(db, source, table, chunk_size).await,
        FileKind::Parquet => load_parquet(db, source, table, chunk_size).await,
    }
}

/// Stream a CSV source in fixed-size row chunks. The first chunk fixes the
/// table schema and replaces the table; later chunks append.
async fn load_csv(db: &Db, source: &Source, table: &str, chunk_size: usize) -> Result<LoadSummary> {
    let name = source.file_name();
    let gzipped = formats::is_gzip(&name);

    let mut chunks = CsvChunks::new(source.reader().await?, gzipped, chunk_size)?;
    let header = chunks.header().to_vec();

    let first = chunks
        .next_chunk()?
        .with_context(|| format!("No data rows in '{}'", name))?;

    let schema = infer_schema(&header, &first)?;
    db.replace_table(table, &schema).await?;
    info!("Table '{}' created", table);

    let bar = progress::row_bar(None);

    db.append_chunk(table, &schema, &first).await?;
    bar.inc(first.len() as u64);
    info!("Inserted: {} rows", first.len());

    let mut total_rows = first.len() as u64;
    let mut chunk_count = 1usize;

    while let Some(chunk) = chunks.next_chunk()? {
        db.append_chunk(table, &schema, &chunk).await?;
        bar.inc(chunk.len() as u64);
        info!("Inserted: {} rows", chunk.len());

        total_rows += chunk.len() as u64;
        chunk_count += 1;
    }

    bar.finish();

    Ok(LoadSummary {
        chunks: chunk_count,
        rows: total_rows,
    })
}

/// Load a Parquet source: the whole file is read into memory, then inserted
/// in row-count slices with the same replace-then-append sequence. The schema
/// comes from the Parquet file itself rather than from sampled values.
async fn load_parquet(
    db: &Db,
    source: &Source,
    table: &str,
    chunk_size: usize,
) -> Result<LoadSummary> {
    info!("Reading parquet file...");
    let data = source.bytes().await?;

    let mut slices = ParquetSlices::new(data, chunk_size)?;
    let schema = slices.table_schema();

    db.replace_table(table, &schema).await?;
    info!("Table '{}' created", table);

    let bar = progress::row_bar(Some(slices.total_rows()));
    let mut total_rows = 0u64;
    let mut chunk_count = 0usize;

    while let Some(chunk) = slices.next_chunk()? {
        db.append_chunk(table, &schema, &chunk).await?;
        bar.inc(chunk.len() as u64);
        info!("Inserted: {} rows", chunk.len());

        total_rows += chunk.len() as u64;
        chunk_count += 1;
    }

    bar.finish();

    Ok(LoadSummary {
        chunks: chunk_count,
        rows: total_rows,
    })
}
