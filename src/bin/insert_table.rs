use anyhow::Result;
use clap::Parser;

use ny_taxi_loader::cli::{self, PgOpts};
use ny_taxi_loader::io::Source;
use ny_taxi_loader::{db, loader};

/// Insert CSV or Parquet data into a PostgreSQL table.
#[derive(Parser, Debug)]
#[command(name = "insert-table")]
struct Args {
    /// URL or path to a CSV/Parquet file
    #[arg(long)]
    file_url: String,

    /// Target table name
    #[arg(long)]
    target_table: String,

    /// Rows per chunk
    #[arg(long, default_value_t = 100_000)]
    chunksize: usize,

    #[command(flatten)]
    pg: PgOpts,
}

#[tokio::main]
async fn main() -> Result<()> {
    cli::init_tracing();
    let args = Args::parse();

    let source = Source::parse(&args.file_url)?;
    let db = db::connect(&args.pg.connect_args()).await?;

    let summary = loader::load_table(&db, &source, &args.target_table, args.chunksize).await?;

    println!("Done! Total rows inserted: {}", summary.rows);
    Ok(())
}
