//! Data shapes shared by the assembler and the CSV side.
//!
//! - [`Cell`] - one table cell, scalar text or a pre-split list
//! - [`Row`] - an ordered run of cells
//! - [`Record`] - an assembled, insertion-ordered field map

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// An assembled record: field name to JSON value, in assembly order.
///
/// Values are strings, lists of strings, string-to-string objects
/// (split with a map pattern) or `null` (unmatched multi columns).
pub type Record = Map<String, Value>;

/// An ordered sequence of cells as it comes out of a table source.
pub type Row = Vec<Cell>;

// =============================================================================
// Cell
// =============================================================================

/// One cell of a table row or CSV entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// Plain scalar text.
    Text(String),
    /// Several values for the same column.
    List(Vec<String>),
}

impl Cell {
    /// Text used when a scalar pattern is matched against this cell.
    ///
    /// Lists are joined with `,`.
    pub fn match_text(&self) -> Cow<'_, str> {
        match self {
            Cell::Text(s) => Cow::Borrowed(s),
            Cell::List(items) => Cow::Owned(items.join(",")),
        }
    }

    /// The cell as a record value, unchanged.
    pub fn to_value(&self) -> Value {
        match self {
            Cell::Text(s) => Value::String(s.clone()),
            Cell::List(items) => Value::Array(items.iter().cloned().map(Value::String).collect()),
        }
    }

    /// Whether the cell holds multiple values.
    pub fn is_list(&self) -> bool {
        matches!(self, Cell::List(_))
    }

    /// Number of output rows this cell needs.
    pub fn height(&self) -> usize {
        match self {
            Cell::Text(_) => 1,
            Cell::List(items) => items.len(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<Vec<String>> for Cell {
    fn from(items: Vec<String>) -> Self {
        Cell::List(items)
    }
}

impl From<Vec<&str>> for Cell {
    fn from(items: Vec<&str>) -> Self {
        Cell::List(items.into_iter().map(str::to_string).collect())
    }
}

/// CSV text for one record value.
///
/// `null` is the empty string and numbers keep their digits, so `0` is `"0"`.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        // Nested values have no CSV shape of their own
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
