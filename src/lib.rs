// Library behind the three loader binaries:
// insert-table, ingest-taxi, make-dataset.
pub mod cli;
pub mod db;
pub mod formats;
pub mod generate;
pub mod io;
pub mod loader;
pub mod progress;
pub mod taxi;

mod config;
