//! Parquet reading: the whole file is held in memory and decoded in
//! fixed row-count slices.

mod conversion;
mod reader;

pub use reader::ParquetSlices;
