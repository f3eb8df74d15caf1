mod column;
mod result_set;
mod row;

pub use column::{Column, Columns};
pub use result_set::ResultSet;
pub use row::Row;
