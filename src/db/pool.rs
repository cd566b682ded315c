//! Database access for the loader binaries.
//!
//! Production connections go to PostgreSQL through sqlx. Tests swap in an
//! in-memory SQLite pool so the load path can run end to end without a
//! server (values are bound as plain strings on that path).

use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use super::schema::{Schema, SqlType, parse_timestamp};
use crate::config::MAX_BIND_PARAMS;
use crate::formats::Record;

/// Connection settings for the target PostgreSQL database.
#[derive(Debug, Clone)]
pub struct ConnectArgs {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database: String,
}

#[derive(Debug, Clone)]
enum DbInner {
    Postgres(sqlx::PgPool),
    #[cfg(test)]
    Sqlite(sqlx::SqlitePool),
}

/// Handle to the target database, held for the duration of one invocation.
#[derive(Debug, Clone)]
pub struct Db {
    inner: DbInner,
}

/// Open a single-connection pool against PostgreSQL.
pub async fn connect(args: &ConnectArgs) -> Result<Db> {
    let options = PgConnectOptions::new()
        .host(&args.host)
        .port(args.port)
        .username(&args.user)
        .password(&args.password)
        .database(&args.database);

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .with_context(|| {
            format!(
                "Failed to connect to postgres at {}:{}/{}",
                args.host, args.port, args.database
            )
        })?;

    Ok(Db {
        inner: DbInner::Postgres(pool),
    })
}

impl Db {
    /// Create an in-memory SQLite database for testing
    #[cfg(test)]
    pub async fn sqlite_in_memory() -> Result<Self> {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory sqlite")?;

        Ok(Db {
            inner: DbInner::Sqlite(pool),
        })
    }

    /// Execute a statement with no parameters (DDL).
    pub async fn execute(&self, sql: &str) -> Result<()> {
        match &self.inner {
            DbInner::Postgres(pool) => {
                sqlx::query(sql).execute(pool).await?;
            }
            #[cfg(test)]
            DbInner::Sqlite(pool) => {
                sqlx::query(sql).execute(pool).await?;
            }
        }
        Ok(())
    }

    /// Drop and recreate the target table from the schema (replace semantics).
    pub async fn replace_table(&self, table: &str, schema: &Schema) -> Result<()> {
        self.execute(&format!("DROP TABLE IF EXISTS \"{}\"", table))
            .await
            .with_context(|| format!("Failed to drop table '{}'", table))?;
        self.execute(&schema.create_table_ddl(table))
            .await
            .with_context(|| format!("Failed to create table '{}'", table))?;
        Ok(())
    }

    /// Append a chunk of records to the table (append semantics).
    ///
    /// The chunk is split across INSERT statements as needed to stay inside
    /// the driver's bind-parameter limit; callers still see one chunk-level
    /// operation.
    pub async fn append_chunk(
        &self,
        table: &str,
        schema: &Schema,
        records: &[Record],
    ) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let num_columns = schema.columns.len().max(1);
        let rows_per_statement = (MAX_BIND_PARAMS / num_columns).max(1);

        for batch in records.chunks(rows_per_statement) {
            self.insert_batch(table, schema, batch).await?;
        }

        Ok(())
    }

    async fn insert_batch(&self, table: &str, schema: &Schema, records: &[Record]) -> Result<()> {
        let num_columns = schema.columns.len();
        let column_list: Vec<String> = schema
            .columns
            .iter()
            .map(|c| format!("\"{}\"", c.name))
            .collect();

        // INSERT INTO "t" ("c1", "c2") VALUES ($1, $2), ($3, $4), ...
        let mut value_groups = Vec::with_capacity(records.len());
        let mut param_idx = 1;
        for _ in 0..records.len() {
            let placeholders: Vec<String> = (0..num_columns)
                .map(|_| {
                    let placeholder = format!("${}", param_idx);
                    param_idx += 1;
                    placeholder
                })
                .collect();
            value_groups.push(format!("({})", placeholders.join(", ")));
        }

        let insert_sql = format!(
            "INSERT INTO \"{}\" ({}) VALUES {}",
            table,
            column_list.join(", "),
            value_groups.join(", ")
        );

        match &self.inner {
            DbInner::Postgres(pool) => {
                let mut query = sqlx::query(&insert_sql);
                for record in records {
                    query = bind_record(query, record, schema)?;
                }
                query
                    .execute(pool)
                    .await
                    .context("Failed to execute batch insert")?;
            }
            #[cfg(test)]
            DbInner::Sqlite(pool) => {
                let sqlite_sql = to_sqlite_placeholders(&insert_sql);
                let mut query = sqlx::query(&sqlite_sql);
                for record in records {
                    for field in &record.fields {
                        if field.is_empty() {
                            query = query.bind(None::<String>);
                        } else {
                            query = query.bind(field);
                        }
                    }
                }
                query
                    .execute(pool)
                    .await
                    .context("Failed to execute batch insert")?;
            }
        }

        Ok(())
    }

    /// Count rows in a table (test assertions).
    #[cfg(test)]
    pub async fn count_rows(&self, table: &str) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM \"{}\"", table);
        let (count,): (i64,) = match &self.inner {
            DbInner::Postgres(pool) => sqlx::query_as(&sql).fetch_one(pool).await?,
            DbInner::Sqlite(pool) => sqlx::query_as(&sql).fetch_one(pool).await?,
        };
        Ok(count)
    }
}

/// Bind one record's fields with types taken from the schema.
fn bind_record<'q>(
    mut query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    record: &'q Record,
    schema: &Schema,
) -> Result<sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>> {
    for (idx, field) in record.fields.iter().enumerate() {
        let sql_type = schema
            .columns
            .get(idx)
            .map(|c| c.sql_type)
            .unwrap_or(SqlType::Text);
        query = bind_typed_value(query, field, sql_type)?;
    }
    Ok(query)
}

fn bind_typed_value<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    value: &'q str,
    sql_type: SqlType,
) -> Result<sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>> {
    let trimmed = value.trim();

    // Empty string is the NULL marker; bind a typed NULL so the driver sends
    // the right parameter type.
    if trimmed.is_empty() {
        return Ok(match sql_type {
            SqlType::Boolean => query.bind(None::<bool>),
            SqlType::BigInt => query.bind(None::<i64>),
            SqlType::DoublePrecision => query.bind(None::<f64>),
            SqlType::Timestamp => query.bind(None::<chrono::NaiveDateTime>),
            SqlType::Date => query.bind(None::<chrono::NaiveDate>),
            SqlType::Text => query.bind(None::<String>),
        });
    }

    Ok(match sql_type {
        SqlType::Boolean => query.bind(parse_bool(trimmed)),
        SqlType::BigInt => query.bind(
            trimmed
                .parse::<i64>()
                .with_context(|| format!("Cannot convert '{}' to BIGINT", trimmed))?,
        ),
        SqlType::DoublePrecision => query.bind(
            trimmed
                .parse::<f64>()
                .with_context(|| format!("Cannot convert '{}' to DOUBLE PRECISION", trimmed))?,
        ),
        SqlType::Timestamp => {
            let timestamp = parse_timestamp(trimmed)
                .with_context(|| format!("Cannot convert '{}' to TIMESTAMP", trimmed))?;
            query.bind(timestamp)
        }
        SqlType::Date => {
            let date = chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .with_context(|| format!("Cannot convert '{}' to DATE", trimmed))?;
            query.bind(date)
        }
        SqlType::Text => query.bind(value),
    })
}

fn parse_bool(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("t") || value == "1"
}

/// Convert Postgres-style placeholders ($1, $2, ...) to SQLite-style (?, ?, ...)
#[cfg(test)]
fn to_sqlite_placeholders(sql: &str) -> String {
    let mut result = String::new();
    let mut chars = sql.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' {
            while chars.peek().is_some_and(|c| c.is_ascii_digit()) {
                chars.next();
            }
            result.push('?');
        } else {
            result.push(ch);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::Column;

    fn record(fields: &[&str]) -> Record {
        Record {
            fields: fields.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn two_column_schema() -> Schema {
        Schema {
            columns: vec![
                Column {
                    name: "id".to_string(),
                    sql_type: SqlType::BigInt,
                    nullable: true,
                },
                Column {
                    name: "name".to_string(),
                    sql_type: SqlType::Text,
                    nullable: true,
                },
            ],
        }
    }

    #[test]
    fn test_to_sqlite_placeholders() {
        assert_eq!(
            to_sqlite_placeholders("INSERT INTO t VALUES ($1, $2), ($3, $4)"),
            "INSERT INTO t VALUES (?, ?), (?, ?)"
        );
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool("T"));
        assert!(parse_bool("1"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool("false"));
    }

    #[tokio::test]
    async fn test_replace_then_append() {
        let db = Db::sqlite_in_memory().await.unwrap();
        let schema = two_column_schema();

        db.replace_table("people", &schema).await.unwrap();
        db.append_chunk("people", &schema, &[record(&["1", "Alice"])])
            .await
            .unwrap();
        db.append_chunk("people", &schema, &[record(&["2", "Bob"]), record(&["3", ""])])
            .await
            .unwrap();

        assert_eq!(db.count_rows("people").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_replace_discards_existing_rows() {
        let db = Db::sqlite_in_memory().await.unwrap();
        let schema = two_column_schema();

        db.replace_table("people", &schema).await.unwrap();
        db.append_chunk("people", &schema, &[record(&["1", "Alice"])])
            .await
            .unwrap();

        db.replace_table("people", &schema).await.unwrap();
        assert_eq!(db.count_rows("people").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_append_empty_chunk_is_a_noop() {
        let db = Db::sqlite_in_memory().await.unwrap();
        let schema = two_column_schema();

        db.replace_table("people", &schema).await.unwrap();
        db.append_chunk("people", &schema, &[]).await.unwrap();

        assert_eq!(db.count_rows("people").await.unwrap(), 0);
    }
}
