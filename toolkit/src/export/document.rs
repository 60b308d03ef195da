//! CSV document: a header list plus entries, serialized as delimited text.

use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::Path;

use super::expander::expand_entry;
use super::options::CsvOptions;
use crate::error::{CsvError, CsvResult};
use crate::models::Cell;

/// Header list plus entries, each entry index-aligned with the headers.
#[derive(Debug, Clone)]
pub struct CsvDocument {
    headers: Vec<String>,
    entries: Vec<Vec<Value>>,
    options: CsvOptions,
}

impl CsvDocument {
    /// Document with an explicit header order.
    pub fn new(headers: Vec<String>, options: CsvOptions) -> Self {
        Self {
            headers,
            entries: Vec::new(),
            options,
        }
    }

    /// Document whose headers are the keys of `object`, in key order.
    pub fn from_keys(object: &Map<String, Value>, options: CsvOptions) -> Self {
        Self::new(object.keys().cloned().collect(), options)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn options(&self) -> &CsvOptions {
        &self.options
    }

    /// Number of entries added so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add an entry given in header order.
    pub fn add_line(&mut self, cells: Vec<Cell>) -> CsvResult<()> {
        if cells.len() != self.headers.len() {
            return Err(CsvError::Cardinality {
                expected: self.headers.len(),
                actual: cells.len(),
            });
        }
        self.entries.push(cells.iter().map(Cell::to_value).collect());
        Ok(())
    }

    /// Add an entry given as an object keyed by header.
    ///
    /// The object must have exactly one key per header and no other keys.
    /// Values are kept as given until serialization, so list elements keep
    /// their falsiness for the row expansion.
    pub fn add_object(&mut self, object: &Map<String, Value>) -> CsvResult<()> {
        if object.len() != self.headers.len() {
            return Err(CsvError::Cardinality {
                expected: self.headers.len(),
                actual: object.len(),
            });
        }
        if let Some(unknown) = object.keys().find(|k| !self.headers.contains(k)) {
            return Err(CsvError::UnknownField(unknown.clone()));
        }

        let values = self
            .headers
            .iter()
            .map(|h| object.get(h).cloned().unwrap_or(Value::Null))
            .collect();
        self.entries.push(values);
        Ok(())
    }

    /// Header row followed by every entry's expanded block, in append order.
    pub fn rows(&self) -> Vec<Vec<String>> {
        let mut rows = Vec::with_capacity(self.entries.len() + 1);
        rows.push(self.headers.clone());
        for entry in &self.entries {
            rows.extend(expand_entry(entry));
        }
        rows
    }

    /// Write the serialized document to `path` in one write.
    pub fn write_to(&self, path: impl AsRef<Path>) -> CsvResult<()> {
        fs::write(path, self.to_string())?;
        Ok(())
    }

    fn write_field(&self, f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
        // No escaping of embedded qualifiers or delimiters
        match self.options.qualifier {
            Some(q) => write!(f, "{}{}{}", q, value, q),
            None => f.write_str(value),
        }
    }
}

impl fmt::Display for CsvDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows().iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            for (j, field) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, "{}", self.options.delimiter)?;
                }
                self.write_field(f, field)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_serialize_quoted() {
        let mut doc = CsvDocument::new(headers(&["a", "b"]), CsvOptions::default());
        doc.add_object(&object(json!({"a": "x", "b": "y"}))).unwrap();
        assert_eq!(doc.to_string(), "\"a\",\"b\"\n\"x\",\"y\"");
    }

    #[test]
    fn test_serialize_bare_with_semicolon() {
        let options = CsvOptions::default().with_qualifier(None).with_delimiter(';');
        let mut doc = CsvDocument::new(headers(&["a", "b"]), options);
        doc.add_line(vec![Cell::from("x"), Cell::from(vec!["1", "2"])]).unwrap();
        assert_eq!(doc.to_string(), "a;b\nx;1\n;2");
    }

    #[test]
    fn test_null_and_zero() {
        let mut doc = CsvDocument::new(headers(&["n", "z"]), CsvOptions::default());
        doc.add_object(&object(json!({"n": null, "z": 0}))).unwrap();
        assert_eq!(doc.to_string(), "\"n\",\"z\"\n\"\",\"0\"");
    }

    #[test]
    fn test_falsy_list_element_is_overwritten() {
        let options = CsvOptions::default().with_qualifier(None);
        let mut doc = CsvDocument::new(headers(&["a"]), options);
        doc.add_object(&object(json!({"a": [0, "x"]}))).unwrap();
        doc.add_object(&object(json!({"a": [false, "y"]}))).unwrap();
        assert_eq!(doc.to_string(), "a\nx\n\ny\n");
    }

    #[test]
    fn test_blocks_in_append_order() {
        let options = CsvOptions::default().with_qualifier(None);
        let mut doc = CsvDocument::new(headers(&["k", "v"]), options);
        doc.add_object(&object(json!({"k": "first", "v": ["1", "2"]}))).unwrap();
        doc.add_object(&object(json!({"k": "second", "v": "3"}))).unwrap();
        assert_eq!(doc.to_string(), "k,v\nfirst,1\n,2\nsecond,3");
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_from_keys_uses_key_order() {
        let record = object(json!({"zeta": 1, "alpha": 2}));
        let doc = CsvDocument::from_keys(&record, CsvOptions::default());
        assert_eq!(doc.headers(), &["zeta".to_string(), "alpha".to_string()]);
    }

    #[test]
    fn test_add_line_cardinality() {
        let mut doc = CsvDocument::new(headers(&["a", "b"]), CsvOptions::default());
        let err = doc.add_line(vec![Cell::from("x")]).unwrap_err();
        assert!(matches!(err, CsvError::Cardinality { expected: 2, actual: 1 }));
        assert!(doc.is_empty());
    }

    #[test]
    fn test_add_object_cardinality() {
        let mut doc = CsvDocument::new(headers(&["a", "b"]), CsvOptions::default());
        let err = doc.add_object(&object(json!({"a": "x"}))).unwrap_err();
        assert!(matches!(err, CsvError::Cardinality { expected: 2, actual: 1 }));
    }

    #[test]
    fn test_add_object_unknown_field() {
        let mut doc = CsvDocument::new(headers(&["a", "b"]), CsvOptions::default());
        let err = doc.add_object(&object(json!({"a": "x", "c": "y"}))).unwrap_err();
        assert!(matches!(err, CsvError::UnknownField(ref f) if f == "c"));
    }

    #[test]
    fn test_header_only_has_no_trailing_newline() {
        let doc = CsvDocument::new(headers(&["a"]), CsvOptions::default());
        assert_eq!(doc.to_string(), "\"a\"");
    }

    #[test]
    fn test_write_to() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut doc = CsvDocument::new(headers(&["a"]), CsvOptions::default().with_qualifier(None));
        doc.add_line(vec![Cell::from("1")]).unwrap();

        doc.write_to(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a\n1");
    }

    #[test]
    fn test_write_error() {
        let dir = tempdir().unwrap();
        let doc = CsvDocument::new(headers(&["a"]), CsvOptions::default());
        let err = doc.write_to(dir.path().join("missing").join("out.csv")).unwrap_err();
        assert!(matches!(err, CsvError::Write(_)));
    }
}
