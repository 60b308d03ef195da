//! Row assembler
//!
//! Applies a compiled header list to the cells of one row and builds a record.

use regex::Regex;
use serde_json::{Map, Value};

use super::header::{HeaderSpec, SpecKind};
use crate::error::{TransformError, TransformResult};
use crate::models::{Cell, Record};
use crate::trace::{emit, LogEntry, Tracer};

/// Assemble one row.
///
/// Cells and specs are paired by position; whatever lies past the shorter
/// of the two is ignored. `row` only labels errors.
pub fn assemble_row(cells: &[Cell], specs: &[Option<HeaderSpec>], row: usize) -> TransformResult<Record> {
    let mut record = Map::new();

    for (cell, spec) in cells.iter().zip(specs) {
        let Some(spec) = spec else {
            continue;
        };

        match &spec.kind {
            SpecKind::Norm { name } => {
                record.insert(name.clone(), cell.to_value());
            }

            SpecKind::Transform { name, pattern } => {
                let text = cell.match_text();
                let caps = pattern.captures(&text).ok_or_else(|| TransformError::FatalValidation {
                    row,
                    field: name.clone(),
                    pattern: pattern.as_str().to_string(),
                    value: text.to_string(),
                })?;
                let value = caps
                    .get(1)
                    .map(|m| Value::String(m.as_str().to_string()))
                    .unwrap_or(Value::Null);
                record.insert(name.clone(), value);
            }

            SpecKind::Multi { names, pattern } => {
                let text = cell.match_text();
                let caps = pattern.captures(&text);
                for (i, name) in names.iter().enumerate() {
                    // No match fills every name with null
                    let value = caps
                        .as_ref()
                        .and_then(|c| c.get(i + 1))
                        .map(|m| Value::String(m.as_str().to_string()))
                        .unwrap_or(Value::Null);
                    record.insert(name.clone(), value);
                }
            }

            SpecKind::Split { name, delimiter } => {
                let parts = split_cell(cell, delimiter);
                let value = match &spec.map_pattern {
                    Some(map_pattern) => map_parts(&parts, map_pattern)
                        .map(Value::Object)
                        .unwrap_or_else(|| list_value(parts)),
                    None => list_value(parts),
                };
                record.insert(name.clone(), value);
            }
        }
    }

    Ok(record)
}

/// Assemble every row, stopping at the first transform mismatch.
pub fn assemble_rows(
    rows: &[Vec<Cell>],
    specs: &[Option<HeaderSpec>],
    tracer: Option<&dyn Tracer>,
) -> TransformResult<Vec<Record>> {
    let mut records = Vec::with_capacity(rows.len());
    for (idx, cells) in rows.iter().enumerate() {
        match assemble_row(cells, specs, idx) {
            Ok(record) => records.push(record),
            Err(e) => {
                emit(tracer, LogEntry::error(format!("Aborting batch: {}", e)));
                return Err(e);
            }
        }
    }
    Ok(records)
}

/// Split a cell on a delimiter regex. Lists are already split.
///
/// Follows `Regex::split`: a delimiter that can match empty text also matches
/// at both ends, leaving an empty first and last fragment.
fn split_cell(cell: &Cell, delimiter: &Regex) -> Vec<String> {
    match cell {
        Cell::Text(s) => delimiter.split(s).map(str::to_string).collect(),
        Cell::List(items) => items.clone(),
    }
}

/// Key/value mapping of the fragments, or `None` as soon as one fragment fails.
fn map_parts(parts: &[String], map_pattern: &Regex) -> Option<Map<String, Value>> {
    let mut mapping = Map::new();
    for part in parts {
        let caps = map_pattern.captures(part)?;
        let key = caps.get(1)?.as_str().to_string();
        let value = caps.get(2)?.as_str().to_string();
        mapping.insert(key, Value::String(value));
    }
    Some(mapping)
}

fn list_value(parts: Vec<String>) -> Value {
    Value::Array(parts.into_iter().map(Value::String).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{LogLevel, MemoryTracer};
    use crate::transform::dsl::header::compile_headers;
    use serde_json::json;

    fn specs(templates: &[Option<&str>]) -> Vec<Option<HeaderSpec>> {
        compile_headers(templates).unwrap()
    }

    fn cells(values: &[&str]) -> Vec<Cell> {
        values.iter().map(|v| Cell::from(*v)).collect()
    }

    #[test]
    fn test_norm_copies_cell() {
        let specs = specs(&[Some("name"), Some("tags")]);
        let row = vec![Cell::from("Alice"), Cell::from(vec!["a", "b"])];
        let record = assemble_row(&row, &specs, 0).unwrap();
        assert_eq!(Value::Object(record), json!({"name": "Alice", "tags": ["a", "b"]}));
    }

    #[test]
    fn test_transform_extracts_group_one() {
        let specs = specs(&[Some(r"year//(\d{4})-\d\d\\")]);
        let record = assemble_row(&cells(&["released 1999-04"]), &specs, 0).unwrap();
        assert_eq!(record["year"], "1999");
    }

    #[test]
    fn test_transform_without_group_is_null() {
        let specs = specs(&[Some(r"flag//yes\\")]);
        let record = assemble_row(&cells(&["yes"]), &specs, 0).unwrap();
        assert_eq!(record["flag"], Value::Null);
    }

    #[test]
    fn test_transform_mismatch_is_fatal() {
        let specs = specs(&[Some(r"year//(\d{4})\\")]);
        let err = assemble_row(&cells(&["unknown"]), &specs, 7).unwrap_err();
        let TransformError::FatalValidation { row, field, value, .. } = err;
        assert_eq!(row, 7);
        assert_eq!(field, "year");
        assert_eq!(value, "unknown");
    }

    #[test]
    fn test_transform_mismatch_aborts_whole_batch() {
        let specs = specs(&[Some(r"n//(\d+)\\")]);
        let rows = vec![cells(&["1"]), cells(&["x"]), cells(&["3"])];
        let tracer = MemoryTracer::new();
        let result = assemble_rows(&rows, &specs, Some(&tracer));
        assert!(result.is_err());
        assert_eq!(tracer.at_level(LogLevel::Error).len(), 1);
    }

    #[test]
    fn test_multi_fills_names_in_group_order() {
        let specs = specs(&[Some(r"first,,last,,age[[(\w+) (\w+), (\d+)]]")]);
        let record = assemble_row(&cells(&["Ada Lovelace, 36"]), &specs, 0).unwrap();
        assert_eq!(Value::Object(record), json!({"first": "Ada", "last": "Lovelace", "age": "36"}));
    }

    #[test]
    fn test_multi_no_match_fills_null() {
        let specs = specs(&[Some(r"first,,last[[(\w+) (\w+)]]")]);
        let record = assemble_row(&cells(&["-"]), &specs, 0).unwrap();
        assert_eq!(Value::Object(record), json!({"first": null, "last": null}));
    }

    #[test]
    fn test_split_equals_regex_split() {
        let specs = specs(&[Some(r"tags{{\s*;\s*}}")]);
        let record = assemble_row(&cells(&["a ; b;c"]), &specs, 0).unwrap();
        assert_eq!(record["tags"], json!(["a", "b", "c"]));
    }

    #[test]
    fn test_split_on_empty_matching_delimiter() {
        let specs = specs(&[Some(r"t{{\s*}}"), Some(r"u{{\s*,?\s*}}")]);
        let record = assemble_row(&cells(&["ab c", "a, b"]), &specs, 0).unwrap();
        assert_eq!(record["t"], json!(["", "a", "b", "c", ""]));
        assert_eq!(record["u"], json!(["", "a", "b", ""]));
    }

    #[test]
    fn test_empty_edge_fragments_defeat_map_pattern() {
        let specs = specs(&[Some(r"t{{\s*}}<<(\w)(.*)>>")]);
        let record = assemble_row(&cells(&["ab c"]), &specs, 0).unwrap();
        assert_eq!(record["t"], json!(["", "a", "b", "c", ""]));
    }

    #[test]
    fn test_split_map_all_fragments_match() {
        let specs = specs(&[Some(r"attrs{{,}}<<(\w+)=(\w+)>>")]);
        let record = assemble_row(&cells(&["color=red,size=xl"]), &specs, 0).unwrap();
        assert_eq!(record["attrs"], json!({"color": "red", "size": "xl"}));
    }

    #[test]
    fn test_split_map_falls_back_to_full_list() {
        let specs = specs(&[Some(r"attrs{{,}}<<(\w+)=(\w+)>>")]);
        let record = assemble_row(&cells(&["color=red,oops,size=xl"]), &specs, 0).unwrap();
        assert_eq!(record["attrs"], json!(["color=red", "oops", "size=xl"]));
    }

    #[test]
    fn test_split_of_list_cell_uses_items() {
        let specs = specs(&[Some(r"attrs{{;}}<<(\w+)=(\w+)>>")]);
        let row = vec![Cell::from(vec!["a=1", "b=2"])];
        let record = assemble_row(&row, &specs, 0).unwrap();
        assert_eq!(record["attrs"], json!({"a": "1", "b": "2"}));
    }

    #[test]
    fn test_map_pattern_inert_outside_split() {
        let specs = specs(&[Some("plain<<(\\w+)=(\\w+)>>")]);
        let record = assemble_row(&cells(&["k=v"]), &specs, 0).unwrap();
        assert_eq!(record["plain"], "k=v");
    }

    #[test]
    fn test_none_spec_skips_column() {
        let specs = specs(&[Some("a"), None, Some("c")]);
        let record = assemble_row(&cells(&["1", "2", "3"]), &specs, 0).unwrap();
        assert_eq!(record.len(), 2);
        assert!(!record.values().any(|v| v == "2"));
    }

    #[test]
    fn test_length_mismatch_tolerated() {
        let wide = specs(&[Some("a"), Some("b"), Some("c")]);
        let record = assemble_row(&cells(&["1", "2"]), &wide, 0).unwrap();
        assert_eq!(Value::Object(record), json!({"a": "1", "b": "2"}));

        let narrow = specs(&[Some("a")]);
        let record = assemble_row(&cells(&["1", "2"]), &narrow, 0).unwrap();
        assert_eq!(Value::Object(record), json!({"a": "1"}));
    }
}
