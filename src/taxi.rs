//! NYC yellow-taxi trip ingestion with a fixed schema.

use anyhow::{Result, bail};
use std::io::Read;
use tracing::info;

use crate::db::{Column, Db, Schema, SqlType};
use crate::formats::csv::CsvChunks;
use crate::loader::LoadSummary;
use crate::progress;

/// Release URL for one month of yellow-taxi trip data.
pub fn trip_data_url(year: i32, month: u32) -> String {
    format!(
        "https://github.com/DataTalksClub/nyc-tlc-data/releases/download/yellow/yellow_tripdata_{}-{:02}.csv.gz",
        year, month
    )
}

/// Column layout of the yellow-taxi trip files, in file order.
///
/// Id and count columns are nullable BIGINT, monetary columns DOUBLE
/// PRECISION, the store-and-forward flag TEXT, and the pickup/dropoff
/// columns parsed TIMESTAMPs.
pub fn trip_schema() -> Schema {
    fn col(name: &str, sql_type: SqlType) -> Column {
        Column {
            name: name.to_string(),
            sql_type,
            nullable: true,
        }
    }

    Schema {
        columns: vec![
            col("VendorID", SqlType::BigInt),
            col("tpep_pickup_datetime", SqlType::Timestamp),
            col("tpep_dropoff_datetime", SqlType::Timestamp),
            col("passenger_count", SqlType::BigInt),
            col("trip_distance", SqlType::DoublePrecision),
            col("RatecodeID", SqlType::BigInt),
            col("store_and_fwd_flag", SqlType::Text),
            col("PULocationID", SqlType::BigInt),
            col("DOLocationID", SqlType::BigInt),
            col("payment_type", SqlType::BigInt),
            col("fare_amount", SqlType::DoublePrecision),
            col("extra", SqlType::DoublePrecision),
            col("mta_tax", SqlType::DoublePrecision),
            col("tip_amount", SqlType::DoublePrecision),
            col("tolls_amount", SqlType::DoublePrecision),
            col("improvement_surcharge", SqlType::DoublePrecision),
            col("total_amount", SqlType::DoublePrecision),
            col("congestion_surcharge", SqlType::DoublePrecision),
        ],
    }
}

/// Ingest one month of trip data from `reader` into `table`.
///
/// The input header must match the trip schema's column names exactly; a
/// reordered or renamed release file is rejected before the table is touched.
/// The table is created up front from the zero-row schema, so no data rows
/// are spent on the replace signal; every chunk, including the first, is
/// appended.
pub async fn ingest_trips(
    db: &Db,
    reader: Box<dyn Read + Send>,
    gzipped: bool,
    table: &str,
    chunk_size: usize,
) -> Result<LoadSummary> {
    let schema = trip_schema();
    let mut chunks = CsvChunks::new(reader, gzipped, chunk_size)?;

    let header: Vec<&str> = chunks.header().iter().map(String::as_str).collect();
    let expected: Vec<&str> = schema.columns.iter().map(|c| c.name.as_str()).collect();
    if header != expected {
        bail!(
            "Input columns do not match the trip schema.\n  expected: {}\n  got:      {}",
            expected.join(", "),
            header.join(", ")
        );
    }

    db.replace_table(table, &schema).await?;
    info!("Table '{}' created", table);

    let bar = progress::row_bar(None);
    let mut total_rows = 0u64;
    let mut chunk_count = 0usize;

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trip_data_url_zero_pads_month() {
        assert_eq!(
            trip_data_url(2021, 1),
            "https://github.com/DataTalksClub/nyc-tlc-data/releases/download/yellow/yellow_tripdata_2021-01.csv.gz"
        );
        assert_eq!(
            trip_data_url(2020, 12),
            "https://github.com/DataTalksClub/nyc-tlc-data/releases/download/yellow/yellow_tripdata_2020-12.csv.gz"
        );
    }

    #[test]
    fn test_trip_schema_shape() {
        let schema = trip_schema();

        assert_eq!(schema.columns.len(), 18);
        assert_eq!(schema.columns[0].name, "VendorID");
        assert_eq!(schema.columns[1].sql_type, SqlType::Timestamp);
        assert_eq!(schema.columns[2].sql_type, SqlType::Timestamp);
        assert_eq!(schema.columns[6].name, "store_and_fwd_flag");
        assert_eq!(schema.columns[6].sql_type, SqlType::Text);
        assert_eq!(schema.columns[17].name, "congestion_surcharge");
        assert!(schema.columns.iter().all(|c| c.nullable));
    }
}
