use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqliteBridgeError {
    #[error("database not initialized")]
    NotInitialized,

    /// A statement inside a batch failed to prepare, step or finalize.
    ///
    /// The display text is the engine's own message. `index` is the zero-based position of the
    /// statement in the batch; `sql` is its text when it got far enough to be prepared.
    #[error("{}", engine_message(.source))]
    Statement {
        index: usize,
        sql: Option<String>,
        #[source]
        source: rusqlite::Error,
    },

    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),
}

impl SqliteBridgeError {
    /// Diagnostic trace for statement failures: which statement of the batch failed and its text.
    #[must_use]
    pub fn diagnostic(&self) -> Option<String> {
        match self {
            Self::Statement {
                index,
                sql: Some(sql),
                ..
            } => Some(format!("statement #{index}: {sql}")),
            Self::Statement {
                index,
                source: rusqlite::Error::SqlInputError { sql, offset, .. },
                ..
            } => {
                let text = sql.trim_start();
                let skipped = i32::try_from(sql.len() - text.len()).unwrap_or(i32::MAX);
                let offset = offset.saturating_sub(skipped).max(0);
                Some(format!(
                    "statement #{index} (not prepared) at offset {offset}: {}",
                    text.trim_end()
                ))
            }
            Self::Statement { index, .. } => Some(format!("statement #{index} (not prepared)")),
            _ => None,
        }
    }

    /// The `SQLite` primary result code behind this error, when the engine produced one.
    #[must_use]
    pub fn sqlite_code(&self) -> Option<i32> {
        match self {
            Self::Statement { source, .. } | Self::SqliteError(source) => primary_code(source),
            _ => None,
        }
    }
}

/// Primary (non-extended) result code carried by a `rusqlite` error.
pub(crate) fn primary_code(err: &rusqlite::Error) -> Option<i32> {
    match err {
        rusqlite::Error::SqliteFailure(ffi_err, _)
        | rusqlite::Error::SqlInputError { error: ffi_err, .. } => {
            Some(ffi_err.extended_code & 0xff)
        }
        _ => None,
    }
}

/// The engine's message without `rusqlite`'s decoration.
///
/// Prepare failures render with the offending SQL and offset appended; only the engine text is
/// kept here, the rest is available through [`SqliteBridgeError::diagnostic`].
fn engine_message(err: &rusqlite::Error) -> String {
    match err {
        rusqlite::Error::SqlInputError { msg, .. } => msg.clone(),
        other => other.to_string(),
    }
}

impl From<serde_json::Error> for SqliteBridgeError {
    fn from(err: serde_json::Error) -> Self {
        SqliteBridgeError::ConfigError(format!("invalid options: {err}"))
    }
}

impl From<tokio::task::JoinError> for SqliteBridgeError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_cancelled() {
            SqliteBridgeError::ExecutionError("sqlite worker task was cancelled".into())
        } else {
            SqliteBridgeError::ExecutionError(format!("sqlite worker panicked: {err}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepare_failure() -> rusqlite::Error {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.prepare("SELEC x FROM t").map(|_| ()).unwrap_err()
    }

    #[test]
    fn prepare_failure_reports_primary_code_and_engine_text() {
        let err = SqliteBridgeError::Statement {
            index: 1,
            sql: None,
            source: prepare_failure(),
        };
        assert_eq!(err.sqlite_code(), Some(rusqlite::ffi::SQLITE_ERROR));
        assert_eq!(err.to_string(), r#"near "SELEC": syntax error"#);
        assert_eq!(
            err.diagnostic().as_deref(),
            Some("statement #1 (not prepared) at offset 0: SELEC x FROM t")
        );
    }

    #[test]
    fn step_failure_keeps_statement_text() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t(x NOT NULL)").unwrap();
        let source = conn.execute("INSERT INTO t VALUES (NULL)", []).unwrap_err();
        let err = SqliteBridgeError::Statement {
            index: 0,
            sql: Some("INSERT INTO t VALUES (NULL)".into()),
            source,
        };
        // SQLITE_CONSTRAINT
        assert_eq!(err.sqlite_code(), Some(19));
        assert_eq!(err.to_string(), "NOT NULL constraint failed: t.x");
        assert_eq!(
            err.diagnostic().as_deref(),
            Some("statement #0: INSERT INTO t VALUES (NULL)")
        );
    }

    #[test]
    fn non_engine_errors_have_no_code() {
        assert_eq!(SqliteBridgeError::NotInitialized.sqlite_code(), None);
        assert_eq!(SqliteBridgeError::NotInitialized.diagnostic(), None);
        let config = SqliteBridgeError::ConfigError("bad".into());
        assert_eq!(config.sqlite_code(), None);
    }
}
