use serde::{Deserialize, Serialize};

/// A marshalled database cell, ready to hand to the host.
///
/// Integers that fit in 32 bits stay exact; wider integers become doubles, so callers see a
/// single numeric model regardless of how `SQLite` stored the value:
/// ```rust
/// use sqlite_bridge::prelude::*;
///
/// let small = CellValue::Integer(42);
/// let wide = CellValue::Double(4_294_967_296.0);
/// assert_eq!(small.as_f64(), Some(42.0));
/// assert_eq!(wide.as_i32(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    /// NULL value
    Null,
    /// Integer within the signed 32-bit range
    Integer(i32),
    /// Floating point value, also used for integers outside the 32-bit range
    Double(f64),
    /// Text value, or the fallback rendering of a value that failed to parse
    Text(String),
    /// Binary data, length-exact copy of the stored bytes
    Blob(Vec<u8>),
}

impl CellValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_i32(&self) -> Option<i32> {
        if let CellValue::Integer(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    /// Numeric view of the cell; compact integers widen losslessly.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(value) => Some(f64::from(*value)),
            CellValue::Double(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let CellValue::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let CellValue::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// JSON rendering used for host-facing row objects. Blobs become arrays of byte values.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            CellValue::Null => serde_json::Value::Null,
            CellValue::Integer(value) => serde_json::Value::from(*value),
            // Non-finite doubles have no JSON form.
            CellValue::Double(value) => serde_json::Number::from_f64(*value)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            CellValue::Text(value) => serde_json::Value::String(value.clone()),
            CellValue::Blob(bytes) => serde_json::Value::Array(
                bytes.iter().map(|b| serde_json::Value::from(*b)).collect(),
            ),
        }
    }
}

/// Runtime storage class of a cell as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ColumnType {
    Null,
    Integer,
    Float,
    Text,
    Blob,
}

impl From<rusqlite::types::Type> for ColumnType {
    fn from(value: rusqlite::types::Type) -> Self {
        match value {
            rusqlite::types::Type::Null => ColumnType::Null,
            rusqlite::types::Type::Integer => ColumnType::Integer,
            rusqlite::types::Type::Real => ColumnType::Float,
            rusqlite::types::Type::Text => ColumnType::Text,
            rusqlite::types::Type::Blob => ColumnType::Blob,
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ColumnType::Null => "NULL",
            ColumnType::Integer => "INTEGER",
            ColumnType::Float => "FLOAT",
            ColumnType::Text => "TEXT",
            ColumnType::Blob => "BLOB",
        };
        f.write_str(name)
    }
}

/// How column descriptors are assigned to rows of a multi-statement batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnPolicy {
    /// Descriptors come from the first row-producing statement and are shared by every row of
    /// the batch, even rows produced by later statements with a different shape.
    #[default]
    FirstStatement,
    /// Each row-producing statement gets its own descriptors.
    PerStatement,
}
