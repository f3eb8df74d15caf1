//! Non-blocking SQL execution over one shared `SQLite` connection.
//!
//! A [`Database`] owns a single `rusqlite` connection. [`Database::exec`] queues a batch of
//! statements on tokio's blocking pool and hands back a [`PendingQuery`] at once; awaiting it
//! yields a [`ResultSet`] whose cells are already marshalled into [`CellValue`]s.
//!
//! ```rust
//! use sqlite_bridge::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), SqliteBridgeError> {
//! let db = Database::new();
//! assert_eq!(db.open(":memory:").await, SQLITE_OK);
//!
//! let rows = db
//!     .exec("CREATE TABLE t (x); INSERT INTO t VALUES (1); SELECT x FROM t")
//!     .await?;
//! assert_eq!(rows.results[0].get("x"), Some(&CellValue::Integer(1)));
//!
//! assert_eq!(db.close().await, SQLITE_OK);
//! # Ok(()) }
//! ```

pub mod bridge;
pub mod config;
pub mod connection;
pub mod error;
pub mod executor;
pub mod marshal;
pub mod prelude;
pub mod results;
pub mod types;

pub use bridge::PendingQuery;
pub use config::{OpenOptions, OpenOptionsBuilder};
pub use connection::{AsyncSqlExecutor, Database, SQLITE_OK, close_db, exec, open_db};
pub use error::SqliteBridgeError;
pub use results::{Column, Columns, ResultSet, Row};
pub use types::{CellValue, ColumnPolicy, ColumnType};
