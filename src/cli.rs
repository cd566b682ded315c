//! Shared command-line plumbing for the loader binaries.

use clap::Args;

use crate::db::ConnectArgs;

/// PostgreSQL connection options shared by the database-backed tools.
#[derive(Args, Debug, Clone)]
pub struct PgOpts {
    /// PostgreSQL user
    #[arg(long, default_value = "root")]
    pub pg_user: String,

    /// PostgreSQL password
    #[arg(long, default_value = "root")]
    pub pg_password: String,

    /// PostgreSQL host
    #[arg(long, default_value = "localhost")]
    pub pg_host: String,

    /// PostgreSQL port
    #[arg(long, default_value_t = 5432)]
    pub pg_port: u16,

    /// PostgreSQL database
    #[arg(long, default_value = "ny_taxi")]
    pub pg_db: String,
}

impl PgOpts {
    pub fn connect_args(&self) -> ConnectArgs {
        ConnectArgs {
            user: self.pg_user.clone(),
            password: self.pg_password.clone(),
            host: self.pg_host.clone(),
            port: self.pg_port,
            database: self.pg_db.clone(),
        }
    }
}

/// Initialize tracing for a binary, honoring RUST_LOG when set.
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ny_taxi_loader=info,sqlx=warn"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        pg: PgOpts,
    }

    #[test]
    fn test_pg_defaults() {
        let cli = TestCli::parse_from(["test"]);
        let args = cli.pg.connect_args();

        assert_eq!(args.user, "root");
        assert_eq!(args.password, "root");
        assert_eq!(args.host, "localhost");
        assert_eq!(args.port, 5432);
        assert_eq!(args.database, "ny_taxi");
    }

    #[test]
    fn test_pg_overrides() {
        let cli = TestCli::parse_from(["test", "--pg-host", "db.internal", "--pg-port", "5433"]);
        let args = cli.pg.connect_args();

        assert_eq!(args.host, "db.internal");
        assert_eq!(args.port, 5433);
    }
}
