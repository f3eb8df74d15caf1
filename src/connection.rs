//! Lifecycle of the single shared connection.

use std::path::Path;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use rusqlite::{Connection, ffi};

use crate::bridge::{ConnectionState, PendingQuery, SharedConnection, dispatch, run_blocking};
use crate::config::OpenOptions;
use crate::error::{SqliteBridgeError, primary_code};
use crate::results::ResultSet;

/// Status code for a successful open or close.
pub const SQLITE_OK: i32 = ffi::SQLITE_OK;

static GLOBAL: LazyLock<Database> = LazyLock::new(Database::new);

/// A handle to one lazily opened `SQLite` connection, shared by every clone of the handle.
///
/// `open` and `close` report engine status codes rather than errors, the way the engine's own
/// open/close calls do. `exec` queues work immediately and returns a [`PendingQuery`].
///
/// ```rust,no_run
/// use sqlite_bridge::prelude::*;
///
/// # async fn demo() -> Result<(), SqliteBridgeError> {
/// let db = Database::new();
/// assert_eq!(db.open("app.db").await, SQLITE_OK);
/// let rows = db
///     .exec("CREATE TABLE IF NOT EXISTS t (id INTEGER, name TEXT); SELECT * FROM t")
///     .await?;
/// println!("{}", rows.to_json());
/// db.close().await;
/// # Ok(()) }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Database {
    shared: SharedConnection,
}

impl Database {
    /// Create a handle with no open connection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide instance behind [`open_db`], [`exec`] and [`close_db`].
    #[must_use]
    pub fn global() -> &'static Database {
        &GLOBAL
    }

    /// Open `path` with default options. See [`Database::open_with`].
    pub async fn open(&self, path: impl AsRef<Path>) -> i32 {
        self.open_with(path, &OpenOptions::default()).await
    }

    /// Open `path` unless a connection is already open, in which case nothing changes and
    /// [`SQLITE_OK`] is returned.
    ///
    /// Returns the engine's primary result code on failure (for example `SQLITE_CANTOPEN`); no
    /// connection is kept in that case.
    pub async fn open_with(&self, path: impl AsRef<Path>, options: &OpenOptions) -> i32 {
        let path = path.as_ref().to_path_buf();
        let options = options.clone();
        run_blocking(Arc::clone(&self.shared), move |state| {
            open_into(state, &path, &options)
        })
        .await
        .unwrap_or_else(|err| {
            tracing::warn!(error = %err, "sqlite open did not complete");
            ffi::SQLITE_ERROR
        })
    }

    /// Queue `sql` (one or more statements) for execution.
    ///
    /// The connection is looked up when the work starts, so a `close` that lands first makes
    /// this query fail with [`SqliteBridgeError::NotInitialized`].
    pub fn exec(&self, sql: impl Into<String>) -> PendingQuery {
        dispatch(Arc::clone(&self.shared), sql.into())
    }

    /// Close the connection and return to the unopened state.
    ///
    /// Waits for queued work that already holds the connection. Returns [`SQLITE_OK`] when
    /// nothing was open.
    pub async fn close(&self) -> i32 {
        run_blocking(Arc::clone(&self.shared), close_from)
            .await
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "sqlite close did not complete");
                ffi::SQLITE_ERROR
            })
    }

    /// Whether a connection is currently stored.
    ///
    /// Waits for any executor run that holds the connection, so the answer reflects the state
    /// after work queued ahead of it.
    pub async fn is_open(&self) -> bool {
        self.shared.lock().await.conn.is_some()
    }
}

fn open_into(state: &mut ConnectionState, path: &Path, options: &OpenOptions) -> i32 {
    if state.conn.is_some() {
        tracing::debug!(path = %path.display(), "sqlite connection already open");
        return SQLITE_OK;
    }

    let conn = match Connection::open_with_flags(path, options.open_flags()) {
        Ok(conn) => conn,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "sqlite open failed");
            return status_of(&err);
        }
    };
    if let Err(err) = configure(&conn, options) {
        tracing::warn!(path = %path.display(), error = %err, "sqlite connection setup failed");
        return status_of(&err);
    }

    tracing::debug!(path = %path.display(), "sqlite connection opened");
    state.conn = Some(conn);
    state.policy = options.column_policy;
    SQLITE_OK
}

fn configure(conn: &Connection, options: &OpenOptions) -> Result<(), rusqlite::Error> {
    if let Some(timeout) = options.busy_timeout() {
        conn.busy_timeout(timeout)?;
    }
    if options.wal {
        let mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        tracing::debug!(journal_mode = %mode, "sqlite journal mode set");
    }
    Ok(())
}

fn close_from(state: &mut ConnectionState) -> i32 {
    let Some(conn) = state.conn.take() else {
        return SQLITE_OK;
    };
    match conn.close() {
        Ok(()) => {
            tracing::debug!("sqlite connection closed");
            SQLITE_OK
        }
        Err((conn, err)) => {
            // Every statement is finalized inside its executor run, so this only happens if the
            // engine itself refuses; the slot is cleared regardless.
            tracing::warn!(error = %err, "sqlite close reported an error");
            drop(conn);
            status_of(&err)
        }
    }
}

fn status_of(err: &rusqlite::Error) -> i32 {
    primary_code(err).unwrap_or(ffi::SQLITE_ERROR)
}

/// Open the process-wide database. See [`Database::open`].
pub async fn open_db(path: impl AsRef<Path>) -> i32 {
    Database::global().open(path).await
}

/// Run SQL on the process-wide database. See [`Database::exec`].
pub fn exec(sql: impl Into<String>) -> PendingQuery {
    Database::global().exec(sql)
}

/// Close the process-wide database. See [`Database::close`].
pub async fn close_db() -> i32 {
    Database::global().close().await
}

/// Async execution seam for code that should not depend on a concrete [`Database`].
#[async_trait]
pub trait AsyncSqlExecutor {
    /// Execute one or more statements and return every row they produce.
    async fn execute(&self, sql: &str) -> Result<ResultSet, SqliteBridgeError>;
}

#[async_trait]
impl AsyncSqlExecutor for Database {
    async fn execute(&self, sql: &str) -> Result<ResultSet, SqliteBridgeError> {
        self.exec(sql).await
    }
}
