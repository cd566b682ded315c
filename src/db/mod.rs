//! Database connection, schema model, and chunk inserts.

pub mod pool;
pub mod schema;

pub use pool::{ConnectArgs, Db, connect};
pub use schema::{Column, Schema, SqlType, infer_schema};
