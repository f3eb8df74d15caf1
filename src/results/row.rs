use std::sync::Arc;

use super::column::Columns;
use crate::types::CellValue;

/// A row from a query result
///
/// Values are positional; the column descriptors are shared with the other rows of the same
/// result (or of the same statement, depending on the column policy).
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub(crate) columns: Arc<Columns>,
    pub(crate) values: Vec<CellValue>,
}

impl Row {
    /// Create a new row
    ///
    /// # Arguments
    ///
    /// * `columns` - The descriptors shared with the other rows of the result
    /// * `values` - The marshalled cells, in column order
    ///
    /// # Returns
    ///
    /// A new `Row` instance
    #[must_use]
    pub fn new(columns: Arc<Columns>, values: Vec<CellValue>) -> Self {
        Self { columns, values }
    }

    /// The column descriptors describing this row
    #[must_use]
    pub fn columns(&self) -> &Arc<Columns> {
        &self.columns
    }

    /// The cells of this row, in column order
    #[must_use]
    pub fn values(&self) -> &[CellValue] {
        &self.values
    }

    /// Get a value from the row by column name
    ///
    /// # Arguments
    ///
    /// * `column_name` - The name of the column
    ///
    /// # Returns
    ///
    /// The value at the column, or None if the column wasn't found. With duplicate names the
    /// last column of that name is returned.
    ///
    /// ```rust
    /// # use sqlite_bridge::prelude::*;
    /// let columns = Columns::new(vec![Column::new("id"), Column::new("name")]);
    /// let row = Row::new(columns, vec![CellValue::Integer(7), CellValue::Text("Ada".into())]);
    /// assert_eq!(row.get("name"), Some(&CellValue::Text("Ada".into())));
    /// assert_eq!(row.get("missing"), None);
    /// ```
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&CellValue> {
        self.columns
            .position(column_name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get a value from the row by column index
    ///
    /// # Arguments
    ///
    /// * `index` - Zero-based position of the column
    ///
    /// # Returns
    ///
    /// The value at the index, or None if the index is out of bounds
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&CellValue> {
        self.values.get(index)
    }

    /// Number of cells in the row
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Render the row as an object keyed by column name.
    ///
    /// Names and values are paired positionally; when a row carries more or fewer values than
    /// there are descriptors (possible when a later statement of a batch has a different shape),
    /// the unpaired tail is left out.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Map<String, serde_json::Value> {
        self.columns
            .names()
            .zip(&self.values)
            .map(|(name, value)| (name.to_string(), value.to_json()))
            .collect()
    }
}
