use anyhow::{Result, bail};
use chrono::{NaiveDate, NaiveDateTime};

use crate::formats::Record;

/// SQL column type used in generated DDL and typed binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Boolean,
    BigInt,
    DoublePrecision,
    Text,
    Timestamp,
    Date,
}

impl SqlType {
    /// Returns the Postgres type name
    pub fn to_postgres(&self) -> &'static str {
        match self {
            SqlType::Boolean => "BOOLEAN",
            SqlType::BigInt => "BIGINT",
            SqlType::DoublePrecision => "DOUBLE PRECISION",
            SqlType::Text => "TEXT",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::Date => "DATE",
        }
    }

    /// Widen two observed types to one that can hold both.
    fn widen(self, other: SqlType) -> SqlType {
        use SqlType::*;
        match (self, other) {
            (a, b) if a == b => a,
            (BigInt, DoublePrecision) | (DoublePrecision, BigInt) => DoublePrecision,
            (Date, Timestamp) | (Timestamp, Date) => Timestamp,
            _ => Text,
        }
    }
}

/// A column in a target table.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub sql_type: SqlType,
    pub nullable: bool,
}

/// Column layout of a target table.
#[derive(Debug, Clone)]
pub struct Schema {
    pub columns: Vec<Column>,
}

impl Schema {
    /// Generate the CREATE TABLE statement for this schema.
    pub fn create_table_ddl(&self, table: &str) -> String {
        let column_defs: Vec<String> = self
            .columns
            .iter()
            .map(|col| {
                let not_null = if col.nullable { "" } else { " NOT NULL" };
                format!(
                    "\"{}\" {}{}",
                    col.name,
                    col.sql_type.to_postgres(),
                    not_null
                )
            })
            .collect();

        format!("CREATE TABLE \"{}\" ({})", table, column_defs.join(", "))
    }
}

/// Infer a table schema from the header and a sample of records.
///
/// Integers map to BIGINT, floats to DOUBLE PRECISION, recognized dates and
/// timestamps to DATE/TIMESTAMP, everything else to TEXT. Conflicting
/// observations widen toward TEXT. Every inferred column is nullable: the
/// sample shows which types occur, but cannot prove that a NULL will not
/// turn up in a later chunk.
pub fn infer_schema(header: &[String], sample: &[Record]) -> Result<Schema> {
    if sample.is_empty() {
        bail!("Cannot infer schema from an empty dataset");
    }

    let mut columns = Vec::with_capacity(header.len());
    for (idx, name) in header.iter().enumerate() {
        let mut inferred: Option<SqlType> = None;

        for record in sample {
            let value = record.fields.get(idx).map(|s| s.as_str()).unwrap_or("");
            if let Some(observed) = infer_value_type(value) {
                inferred = Some(match inferred {
                    Some(current) => current.widen(observed),
                    None => observed,
                });
            }
        }

        columns.push(Column {
            name: name.clone(),
            sql_type: inferred.unwrap_or(SqlType::Text),
            nullable: true,
        });
    }

    Ok(Schema { columns })
}

fn infer_value_type(value: &str) -> Option<SqlType> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return None; // Null value
    }

    if trimmed.parse::<i64>().is_ok() {
        return Some(SqlType::BigInt);
    }

    if trimmed.parse::<f64>().is_ok() {
        return Some(SqlType::DoublePrecision);
    }

    if NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").is_ok() {
        return Some(SqlType::Date);
    }

    if parse_timestamp(trimmed).is_some() {
        return Some(SqlType::Timestamp);
    }

    Some(SqlType::Text)
}

/// Parse the timestamp formats the loaders encounter.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];

    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}
