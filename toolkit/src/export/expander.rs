//! Row expansion: one entry with list values → a block of aligned rows.

use serde_json::Value;

use crate::models::value_text;

/// Expand one entry into `max(1, longest array)` rows of equal width.
///
/// Scalar values land in the first row only. Array values gravity-fill their
/// own column: each element goes to the lowest row whose slot is still
/// empty. Columns are filled independently, so row `r` is not a tuple of
/// related values.
///
/// A slot counts as empty while it holds a falsy value (`null`, `""`, `0`,
/// `false`), so a falsy list element is overwritten by the element after it.
/// Callers rely on this; see `test_falsy_element_is_overwritten`.
pub fn expand_entry(entry: &[Value]) -> Vec<Vec<String>> {
    let height = entry.iter().map(height).max().unwrap_or(1).max(1);
    let mut slots = vec![vec![Value::String(String::new()); entry.len()]; height];

    for (col, value) in entry.iter().enumerate() {
        match value {
            Value::Array(items) => {
                for item in items {
                    if let Some(row) = slots.iter_mut().find(|r| is_falsy(&r[col])) {
                        row[col] = item.clone();
                    }
                }
            }
            scalar => slots[0][col] = scalar.clone(),
        }
    }

    slots
        .iter()
        .map(|row| row.iter().map(value_text).collect())
        .collect()
}

fn height(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.len(),
        _ => 1,
    }
}

/// Slot emptiness test used by the gravity fill.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_all_scalar_is_one_row() {
        let rows = expand_entry(&[json!("a"), json!("b")]);
        assert_eq!(rows, vec![row(&["a", "b"])]);
    }

    #[test]
    fn test_height_is_longest_list() {
        let rows = expand_entry(&[json!("x"), json!(["1", "2", "3"])]);
        assert_eq!(rows, vec![row(&["x", "1"]), row(&["", "2"]), row(&["", "3"])]);
    }

    #[test]
    fn test_columns_fill_independently() {
        let rows = expand_entry(&[json!(["a1", "a2"]), json!(["b1", "b2", "b3"]), json!("s")]);
        assert_eq!(
            rows,
            vec![row(&["a1", "b1", "s"]), row(&["a2", "b2", ""]), row(&["", "b3", ""])]
        );
    }

    #[test]
    fn test_empty_list_keeps_minimum_height() {
        let rows = expand_entry(&[json!("a"), json!([])]);
        assert_eq!(rows, vec![row(&["a", ""])]);
        assert_eq!(expand_entry(&[]), vec![Vec::<String>::new()]);
    }

    #[test]
    fn test_scalar_zero_and_null() {
        let rows = expand_entry(&[json!(0), json!(null), json!(false)]);
        assert_eq!(rows, vec![row(&["0", "", "false"])]);
    }

    #[test]
    fn test_falsy_element_is_overwritten() {
        // Known defect: a falsy value in row 0 reads as a free slot
        assert_eq!(expand_entry(&[json!(["", "b", "c"])]), vec![row(&["b"]), row(&["c"]), row(&[""])]);
        assert_eq!(expand_entry(&[json!([0, "x"])]), vec![row(&["x"]), row(&[""])]);
        assert_eq!(expand_entry(&[json!([false, "x"])]), vec![row(&["x"]), row(&[""])]);
        assert_eq!(expand_entry(&[json!([null, 0.0, "x"])]), vec![row(&["x"]), row(&[""]), row(&[""])]);
    }

    #[test]
    fn test_truthy_text_is_kept() {
        // "0" and "false" are non-empty text, not falsy values
        let rows = expand_entry(&[json!(["0", "false", "x"])]);
        assert_eq!(rows, vec![row(&["0"]), row(&["false"]), row(&["x"])]);
    }

    #[test]
    fn test_trailing_falsy_element_stays() {
        let rows = expand_entry(&[json!(["a", 0])]);
        assert_eq!(rows, vec![row(&["a"]), row(&["0"])]);
    }
}
