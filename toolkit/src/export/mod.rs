//! CSV export module.
//!
//! Flattens records back into delimited text:
//! - Expander: one entry with list cells → aligned row block
//! - Document: header list + entries → text
//! - Options: qualifier and delimiter

pub mod document;
pub mod expander;
pub mod options;

pub use document::CsvDocument;
pub use expander::expand_entry;
pub use options::CsvOptions;

use crate::error::CsvResult;
use crate::models::Record;

/// Build a document from records, taking headers from the first record's keys.
///
/// Every record must carry exactly those keys.
pub fn records_to_document(records: &[Record], options: CsvOptions) -> CsvResult<CsvDocument> {
    let mut doc = match records.first() {
        Some(first) => CsvDocument::from_keys(first, options),
        None => CsvDocument::new(Vec::new(), options),
    };
    for record in records {
        doc.add_object(record)?;
    }
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CsvError;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_records_to_document() {
        let records = vec![
            record(json!({"title": "A", "tags": ["x", "y"]})),
            record(json!({"title": "B", "tags": []})),
        ];
        let doc = records_to_document(&records, CsvOptions::default().with_qualifier(None)).unwrap();
        assert_eq!(doc.to_string(), "title,tags\nA,x\n,y\nB,");
    }

    #[test]
    fn test_records_with_different_keys() {
        let records = vec![record(json!({"a": 1})), record(json!({"b": 2}))];
        let err = records_to_document(&records, CsvOptions::default()).unwrap_err();
        assert!(matches!(err, CsvError::UnknownField(ref f) if f == "b"));
    }

    #[test]
    fn test_no_records() {
        let doc = records_to_document(&[], CsvOptions::default()).unwrap();
        assert_eq!(doc.to_string(), "");
    }
}
