use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use ny_taxi_loader::{cli, generate};

/// Generate the synthetic two-column sample dataset for one day.
#[derive(Parser, Debug)]
#[command(name = "make-dataset")]
struct Args {
    /// Day tag written into every row and into the output file name
    day: i64,
}

fn main() -> Result<()> {
    cli::init_tracing();
    let args = Args::parse();

    let cwd = std::env::current_dir().context("Failed to resolve working directory")?;
    let path = generate::write_sample_file(args.day, &cwd)?;
    info!("Wrote {}", path.display());

    println!("job finished successfully for day = {}", args.day);
    Ok(())
}
