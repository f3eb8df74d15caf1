use std::sync::Arc;

use super::column::Columns;
use super::row::Row;
use crate::types::CellValue;

/// The complete result of one `exec` call.
///
/// A result set is only ever handed out whole: the executor either returns every row of the
/// batch or an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    /// The rows returned by the batch, in statement then step order
    pub results: Vec<Row>,
    columns: Option<Arc<Columns>>,
}

impl ResultSet {
    /// Create a new result set with a known capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - The initial capacity for the result rows
    ///
    /// # Returns
    ///
    /// A new, empty `ResultSet` with preallocated capacity and no column descriptors
    #[must_use]
    pub fn with_capacity(capacity: usize) -> ResultSet {
        ResultSet {
            results: Vec::with_capacity(capacity),
            columns: None,
        }
    }

    /// Set the descriptors reported for this result. Only the first call takes effect.
    pub fn set_columns(&mut self, columns: Arc<Columns>) {
        if self.columns.is_none() {
            self.columns = Some(columns);
        }
    }

    /// Column descriptors of the first row-producing statement, if any statement had columns.
    #[must_use]
    pub fn columns(&self) -> Option<&Arc<Columns>> {
        self.columns.as_ref()
    }

    /// Add a row to the result set
    ///
    /// # Arguments
    ///
    /// * `columns` - The descriptors for this row; shared, not copied
    /// * `values` - The marshalled cells for this row
    pub fn add_row_values(&mut self, columns: &Arc<Columns>, values: Vec<CellValue>) {
        self.results.push(Row::new(Arc::clone(columns), values));
    }

    /// Number of rows returned by the batch
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Iterate over the rows in statement then step order
    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.results.iter()
    }

    /// Host-facing rendering: an array with one object per row.
    ///
    /// ```rust
    /// # use sqlite_bridge::prelude::*;
    /// # async fn demo() -> Result<(), SqliteBridgeError> {
    /// let db = Database::new();
    /// db.open(":memory:").await;
    /// let rows = db.exec("SELECT 1 AS a, 'x' AS b").await?;
    /// assert_eq!(rows.to_json(), serde_json::json!([{ "a": 1, "b": "x" }]));
    /// # Ok(()) }
    /// ```
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(
            self.results
                .iter()
                .map(|row| serde_json::Value::Object(row.to_json()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

impl IntoIterator for ResultSet {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}
