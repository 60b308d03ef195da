//! Table sources
//!
//! A table source yields the raw cells of its selected rows. Two sources ship:
//! [`HtmlTable`] over an HTML document and [`DelimitedTable`] over parsed
//! delimited text.

use scraper::{ElementRef, Html, Selector};

use crate::error::{ConfigError, PipelineError, PipelineResult};
use crate::parser::ParsedTable;

/// Default row selector for HTML tables: body rows, so `thead` labels stay
/// out of the templates. Use `tr` to take every row.
pub const DEFAULT_ROW_SELECTOR: &str = "tbody tr";

/// One cell as found in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCell {
    /// Inner markup of the cell
    pub markup: String,
    /// Sanitized text content
    pub text: String,
}

impl RawCell {
    /// Build a cell from markup and its unsanitized text.
    pub fn new(markup: impl Into<String>, text: &str) -> Self {
        Self {
            markup: markup.into(),
            text: sanitize_text(text),
        }
    }
}

/// Something that yields rows of raw cells in source order
pub trait TableSource {
    fn raw_rows(&self) -> PipelineResult<Vec<Vec<RawCell>>>;
}

/// Collapse whitespace runs to one space, drop control characters, trim.
pub fn sanitize_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else if !ch.is_control() {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

fn parse_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::Selector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

// =============================================================================
// HTML
// =============================================================================

/// The first table matching a CSS selector in an HTML document.
pub struct HtmlTable {
    document: Html,
    table_selector: String,
    table: Selector,
    rows: Selector,
}

impl HtmlTable {
    /// Parse `html` and prepare the table and row selectors.
    pub fn new(html: &str, table_selector: &str, row_selector: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            document: Html::parse_document(html),
            table_selector: table_selector.to_string(),
            table: parse_selector(table_selector)?,
            rows: parse_selector(row_selector)?,
        })
    }

    /// Number of tables matching the table selector
    pub fn table_count(&self) -> usize {
        self.document.select(&self.table).count()
    }
}

impl TableSource for HtmlTable {
    fn raw_rows(&self) -> PipelineResult<Vec<Vec<RawCell>>> {
        let table = self
            .document
            .select(&self.table)
            .next()
            .ok_or_else(|| PipelineError::TableNotFound(self.table_selector.clone()))?;

        let rows = table
            .select(&self.rows)
            .map(|row| {
                row.children()
                    .filter_map(ElementRef::wrap)
                    .map(|cell| RawCell::new(cell.inner_html(), &cell.text().collect::<String>()))
                    .collect()
            })
            .collect();

        Ok(rows)
    }
}

// =============================================================================
// Delimited text
// =============================================================================

/// Data rows of a parsed delimited file. The header line is not a row.
pub struct DelimitedTable {
    rows: Vec<Vec<String>>,
}

impl DelimitedTable {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }
}

impl From<ParsedTable> for DelimitedTable {
    fn from(parsed: ParsedTable) -> Self {
        Self::new(parsed.rows)
    }
}

impl TableSource for DelimitedTable {
    fn raw_rows(&self) -> PipelineResult<Vec<Vec<RawCell>>> {
        Ok(self
            .rows
            .iter()
            .map(|row| row.iter().map(|v| RawCell::new(v.as_str(), v)).collect())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <table class="other"><tr><td>ignored</td></tr></table>
        <table id="films">
          <thead><tr><th>Title</th><th>Year</th></tr></thead>
          <tbody>
            <tr><td> The   Matrix </td><td><b>1999</b></td></tr>
            <tr><td>Alien&nbsp;(director's cut)</td><td>1979</td></tr>
          </tbody>
        </table>
        </body></html>"#;

    #[test]
    fn test_sanitize_text() {
        assert_eq!(sanitize_text("  a \n\t b\u{7}c  "), "a bc");
        assert_eq!(sanitize_text("x\u{a0}y"), "x y");
    }

    #[test]
    fn test_html_rows_in_source_order() {
        let table = HtmlTable::new(PAGE, "#films", "tbody tr").unwrap();
        let rows = table.raw_rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0].text, "The Matrix");
        assert_eq!(rows[0][1].markup, "<b>1999</b>");
        assert_eq!(rows[0][1].text, "1999");
        assert_eq!(rows[1][0].text, "Alien (director's cut)");
    }

    #[test]
    fn test_default_row_selector_skips_thead() {
        let table = HtmlTable::new(PAGE, "#films", DEFAULT_ROW_SELECTOR).unwrap();
        let rows = table.raw_rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0].text, "The Matrix");
    }

    #[test]
    fn test_html_row_selector_includes_header_row() {
        let table = HtmlTable::new(PAGE, "#films", "tr").unwrap();
        let rows = table.raw_rows().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0].text, "Title");
    }

    #[test]
    fn test_missing_table() {
        let table = HtmlTable::new(PAGE, "#nope", "tr").unwrap();
        assert!(matches!(table.raw_rows(), Err(PipelineError::TableNotFound(_))));
        assert_eq!(table.table_count(), 0);
    }

    #[test]
    fn test_bad_selector() {
        assert!(matches!(
            HtmlTable::new(PAGE, "table[", "tr"),
            Err(ConfigError::Selector { .. })
        ));
    }

    #[test]
    fn test_delimited_rows() {
        let table = DelimitedTable::new(vec![vec!["a  b".into(), "c".into()]]);
        let rows = table.raw_rows().unwrap();
        assert_eq!(rows[0][0].markup, "a  b");
        assert_eq!(rows[0][0].text, "a b");
    }
}
