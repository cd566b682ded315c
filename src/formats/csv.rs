//! Streaming CSV reader that yields fixed-size row chunks.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::io::Read;

use super::Record;

/// Chunked reader over a CSV source.
///
/// The header row is consumed on construction; `next_chunk` then yields up to
/// `chunk_size` data records at a time until the source is exhausted.
pub struct CsvChunks {
    header: Vec<String>,
    chunk_size: usize,
    records: ::csv::StringRecordsIntoIter<Box<dyn Read + Send>>,
}

impl CsvChunks {
    /// Wrap a reader, decompressing gzip when `gzipped` is set.
    pub fn new(reader: Box<dyn Read + Send>, gzipped: bool, chunk_size: usize) -> Result<Self> {
        let reader: Box<dyn Read + Send> = if gzipped {
            Box::new(GzDecoder::new(reader))
        } else {
            reader
        };

        let mut csv_reader = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let header = csv_reader
            .headers()
            .context("Failed to read CSV header")?
            .iter()
            .map(|s| s.to_string())
            .collect();

        Ok(Self {
            header,
            chunk_size,
            records: csv_reader.into_records(),
        })
    }

    /// Column names from the header row.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Read up to `chunk_size` records. Returns `None` once the source is
    /// exhausted.
    pub fn next_chunk(&mut self) -> Result<Option<Vec<Record>>> {
        let mut chunk = Vec::with_capacity(self.chunk_size);

        while chunk.len() < self.chunk_size {
            match self.records.next() {
                Some(result) => {
                    let record = result.context("Failed to parse CSV record")?;
                    chunk.push(Record {
                        fields: record.iter().map(|s| s.to_string()).collect(),
                    });
                }
                None => break,
            }
        }

        if chunk.is_empty() {
            Ok(None)
        } else {
            Ok(Some(chunk))
        }
    }
}
