use std::time::Duration;

use rusqlite::OpenFlags;
use serde::{Deserialize, Serialize};

use crate::error::SqliteBridgeError;
use crate::types::ColumnPolicy;

/// Options applied when a [`Database`](crate::Database) opens its connection.
///
/// They can be built in code or loaded from JSON:
/// ```rust
/// use sqlite_bridge::prelude::*;
///
/// let opts = OpenOptions::from_json(r#"{ "busy_timeout_ms": 250, "column_policy": "per_statement" }"#)?;
/// assert_eq!(opts.column_policy, ColumnPolicy::PerStatement);
/// assert!(opts.create);
/// # Ok::<(), SqliteBridgeError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenOptions {
    /// Open the file read-only. Takes precedence over `create`.
    pub read_only: bool,
    /// Create the file when it does not exist.
    pub create: bool,
    /// How long the engine waits on a locked database before reporting `SQLITE_BUSY`.
    pub busy_timeout_ms: Option<u64>,
    /// Switch the journal to write-ahead logging after opening.
    pub wal: bool,
    pub column_policy: ColumnPolicy,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            read_only: false,
            create: true,
            busy_timeout_ms: None,
            wal: false,
            column_policy: ColumnPolicy::FirstStatement,
        }
    }
}

impl OpenOptions {
    #[must_use]
    pub fn builder() -> OpenOptionsBuilder {
        OpenOptionsBuilder::new()
    }

    /// Parse options from a JSON object; missing fields keep their defaults.
    ///
    /// # Errors
    /// Returns [`SqliteBridgeError::ConfigError`] when the text is not a valid options object.
    pub fn from_json(text: &str) -> Result<Self, SqliteBridgeError> {
        Ok(serde_json::from_str(text)?)
    }

    #[must_use]
    pub fn busy_timeout(&self) -> Option<Duration> {
        self.busy_timeout_ms.map(Duration::from_millis)
    }

    /// Engine open flags. URI filenames stay enabled so `file::memory:?cache=shared` works.
    #[must_use]
    pub fn open_flags(&self) -> OpenFlags {
        let access = if self.read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY
        } else if self.create {
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE
        };
        access | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX
    }
}

/// Fluent builder for [`OpenOptions`].
#[derive(Debug, Clone, Default)]
pub struct OpenOptionsBuilder {
    opts: OpenOptions,
}

impl OpenOptionsBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.opts.read_only = read_only;
        self
    }

    #[must_use]
    pub fn create(mut self, create: bool) -> Self {
        self.opts.create = create;
        self
    }

    #[must_use]
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.opts.busy_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    #[must_use]
    pub fn wal(mut self, wal: bool) -> Self {
        self.opts.wal = wal;
        self
    }

    #[must_use]
    pub fn column_policy(mut self, policy: ColumnPolicy) -> Self {
        self.opts.column_policy = policy;
        self
    }

    #[must_use]
    pub fn finish(self) -> OpenOptions {
        self.opts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_create_read_write() {
        let opts = OpenOptions::default();
        let flags = opts.open_flags();
        assert!(flags.contains(OpenFlags::SQLITE_OPEN_READ_WRITE));
        assert!(flags.contains(OpenFlags::SQLITE_OPEN_CREATE));
        assert!(flags.contains(OpenFlags::SQLITE_OPEN_URI));
        assert_eq!(opts.busy_timeout(), None);
    }

    #[test]
    fn read_only_wins_over_create() {
        let opts = OpenOptions::builder().read_only(true).create(true).finish();
        let flags = opts.open_flags();
        assert!(flags.contains(OpenFlags::SQLITE_OPEN_READ_ONLY));
        assert!(!flags.contains(OpenFlags::SQLITE_OPEN_CREATE));
    }

    #[test]
    fn builder_sets_every_field() {
        let opts = OpenOptions::builder()
            .create(false)
            .busy_timeout(Duration::from_millis(1500))
            .wal(true)
            .column_policy(ColumnPolicy::PerStatement)
            .finish();
        assert!(!opts.create);
        assert_eq!(opts.busy_timeout_ms, Some(1500));
        assert!(opts.wal);
        assert_eq!(opts.column_policy, ColumnPolicy::PerStatement);
    }

    #[test]
    fn json_round_trip_and_rejects_garbage() {
        let opts = OpenOptions::builder().wal(true).finish();
        let text = serde_json::to_string(&opts).unwrap();
        assert_eq!(OpenOptions::from_json(&text).unwrap(), opts);

        let err = OpenOptions::from_json("{ \"wal\": \"yes\" }").unwrap_err();
        assert!(matches!(err, SqliteBridgeError::ConfigError(_)));
    }
}
