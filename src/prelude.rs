//! Convenient imports for common functionality.

pub use crate::bridge::PendingQuery;
pub use crate::config::{OpenOptions, OpenOptionsBuilder};
pub use crate::connection::{AsyncSqlExecutor, Database, SQLITE_OK, close_db, exec, open_db};
pub use crate::error::SqliteBridgeError;
pub use crate::marshal::{RawCell, marshal_cell};
pub use crate::results::{Column, Columns, ResultSet, Row};
pub use crate::types::{CellValue, ColumnPolicy, ColumnType};
