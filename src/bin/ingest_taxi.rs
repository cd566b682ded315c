use anyhow::Result;
use clap::Parser;

use ny_taxi_loader::cli::{self, PgOpts};
use ny_taxi_loader::io::Source;
use ny_taxi_loader::{db, taxi};

/// Ingest NYC yellow-taxi trip data into a PostgreSQL table.
#[derive(Parser, Debug)]
#[command(name = "ingest-taxi")]
struct Args {
    /// Year of the data
    #[arg(long, default_value_t = 2021)]
    year: i32,

    /// Month of the data
    #[arg(long, default_value_t = 1)]
    month: u32,

    /// Rows per chunk
    #[arg(long, default_value_t = 100_000)]
    chunksize: usize,

    /// Target table for the data
    #[arg(long, default_value = "yellow_taxi_data")]
    target_table: String,

    #[command(flatten)]
    pg: PgOpts,
}

#[tokio::main]
async fn main() -> Result<()> {
    cli::init_tracing();
    let args = Args::parse();

    let url = taxi::trip_data_url(args.year, args.month);
    let source = Source::parse(&url)?;
    let db = db::connect(&args.pg.connect_args()).await?;

    // Monthly release files are always gzipped CSV
    let reader = source.reader().await?;
    let summary =
        taxi::ingest_trips(&db, reader, true, &args.target_table, args.chunksize).await?;

    println!("Done! Total rows inserted: {}", summary.rows);
    Ok(())
}
