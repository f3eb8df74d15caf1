//! Cell marshalling rules.
//!
//! Two entry points share one rule set: [`marshal_cell`] works from the engine's textual
//! rendering (plus raw bytes for BLOBs), [`marshal_value_ref`] works from `rusqlite`'s typed
//! accessor. Neither can fail; values that do not parse degrade to their text.

use rusqlite::types::ValueRef;

use crate::types::{CellValue, ColumnType};

/// Rendering used when a BLOB cell arrives without its bytes.
pub const BLOB_SENTINEL: &str = "[BLOB]";

/// A cell as captured from a result row: its runtime type, its textual rendering and, for
/// BLOBs, the raw bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCell {
    pub kind: ColumnType,
    pub text: String,
    pub blob: Option<Vec<u8>>,
}

impl RawCell {
    #[must_use]
    pub fn new(kind: ColumnType, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            blob: None,
        }
    }

    #[must_use]
    pub fn with_blob(mut self, bytes: Vec<u8>) -> Self {
        self.blob = Some(bytes);
        self
    }
}

/// Marshal a cell from its textual rendering.
///
/// The text is parsed exactly as the engine rendered it; anything that is not a complete
/// number, including surrounding whitespace, stays text.
#[must_use]
pub fn marshal_cell(cell: &RawCell) -> CellValue {
    match cell.kind {
        ColumnType::Null => CellValue::Null,
        ColumnType::Integer => match cell.text.parse::<i64>() {
            Ok(value) => narrow_integer(value),
            Err(_) => CellValue::Text(cell.text.clone()),
        },
        ColumnType::Float => match cell.text.parse::<f64>() {
            Ok(value) => CellValue::Double(value),
            Err(_) => CellValue::Text(cell.text.clone()),
        },
        ColumnType::Text => CellValue::Text(cell.text.clone()),
        ColumnType::Blob => match &cell.blob {
            Some(bytes) => CellValue::Blob(bytes.clone()),
            None => CellValue::Text(BLOB_SENTINEL.to_string()),
        },
    }
}

/// Marshal a cell straight from the engine's typed accessor.
#[must_use]
pub fn marshal_value_ref(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Null,
        ValueRef::Integer(i) => narrow_integer(i),
        ValueRef::Real(f) => CellValue::Double(f),
        ValueRef::Text(bytes) => CellValue::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => CellValue::Blob(bytes.to_vec()),
    }
}

/// Keep integers in the 32-bit range exact; wider values become the nearest double.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn narrow_integer(value: i64) -> CellValue {
    match i32::try_from(value) {
        Ok(small) => CellValue::Integer(small),
        Err(_) => CellValue::Double(value as f64),
    }
}
