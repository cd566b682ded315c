//! File format detection and chunked readers

pub mod csv;
pub mod parquet;

use anyhow::{Result, bail};

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Parquet,
}

/// Detect the file format from a path or URL suffix.
pub fn detect(name: &str) -> Result<FileKind> {
    let lower = name.to_lowercase();
    if lower.ends_with(".parquet") {
        Ok(FileKind::Parquet)
    } else if lower.ends_with(".csv") || lower.ends_with(".csv.gz") {
        Ok(FileKind::Csv)
    } else {
        bail!(
            "Unsupported file type '{}'. Use .csv, .csv.gz, or .parquet",
            name
        )
    }
}

/// Whether the source is gzip-compressed, by suffix.
pub fn is_gzip(name: &str) -> bool {
    name.to_lowercase().ends_with(".gz")
}

/// A single row of string fields. Empty strings represent NULL.
#[derive(Debug, Clone)]
pub struct Record {
    pub fields: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_parquet() {
        assert_eq!(detect("data.parquet").unwrap(), FileKind::Parquet);
    }

    #[test]
    fn test_detect_csv() {
        assert_eq!(detect("data.csv").unwrap(), FileKind::Csv);
    }

    #[test]
    fn test_detect_gzipped_csv() {
        assert_eq!(detect("data.csv.gz").unwrap(), FileKind::Csv);
    }

    #[test]
    fn test_detect_case_insensitive() {
        assert_eq!(detect("DATA.CSV").unwrap(), FileKind::Csv);
        assert_eq!(detect("DATA.Parquet").unwrap(), FileKind::Parquet);
    }

    #[test]
    fn test_detect_unsupported_extension() {
        let err = detect("data.txt").unwrap_err();
        assert!(err.to_string().contains("Unsupported file type"));
    }

    #[test]
    fn test_is_gzip() {
        assert!(is_gzip("trips.csv.gz"));
        assert!(!is_gzip("trips.csv"));
        assert!(!is_gzip("trips.parquet"));
    }
}
