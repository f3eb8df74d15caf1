//! Opens a database, runs one SQL batch through the bridge and prints the rows as JSON.
//!
//! ```text
//! cargo run --example exec_cli -- --db app.db "CREATE TABLE t(x); INSERT INTO t VALUES (1); SELECT * FROM t"
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use sqlite_bridge::prelude::*;
use tracing::{Level, error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Run a SQL batch against a SQLite file")]
struct Args {
    /// Database path; `:memory:` for a throwaway database.
    #[arg(long, default_value = ":memory:")]
    db: PathBuf,
    /// Semicolon-separated statements.
    sql: String,
    #[arg(long)]
    read_only: bool,
    #[arg(long)]
    wal: bool,
    #[arg(long)]
    busy_timeout_ms: Option<u64>,
    /// Describe every statement's rows by its own columns.
    #[arg(long)]
    per_statement: bool,
    #[arg(long)]
    verbose: bool,
}

impl Args {
    fn open_options(&self) -> OpenOptions {
        let mut builder = OpenOptions::builder()
            .read_only(self.read_only)
            .wal(self.wal);
        if let Some(ms) = self.busy_timeout_ms {
            builder = builder.busy_timeout(Duration::from_millis(ms));
        }
        if self.per_statement {
            builder = builder.column_policy(ColumnPolicy::PerStatement);
        }
        builder.finish()
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if args.verbose { Level::TRACE } else { Level::INFO })
        .init();

    let db = Database::new();
    let code = db.open_with(&args.db, &args.open_options()).await;
    if code != SQLITE_OK {
        error!(code, path = %args.db.display(), "open failed");
        return ExitCode::FAILURE;
    }

    let outcome = db.exec(args.sql.as_str()).await;
    let status = match outcome {
        Ok(rows) => {
            info!(rows = rows.len(), "batch finished");
            match serde_json::to_string_pretty(&rows.to_json()) {
                Ok(text) => {
                    println!("{text}");
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    error!(%err, "could not render rows");
                    ExitCode::FAILURE
                }
            }
        }
        Err(err) => {
            match err.diagnostic() {
                Some(location) => error!(%err, at = %location, "batch failed"),
                None => error!(%err, "batch failed"),
            }
            ExitCode::FAILURE
        }
    };

    let closed = db.close().await;
    if closed != SQLITE_OK {
        error!(code = closed, "close failed");
        return ExitCode::FAILURE;
    }
    status
}
