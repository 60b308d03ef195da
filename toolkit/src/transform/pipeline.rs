//! Table pipeline: table source → cells → records.
//!
//! # Example
//!
//! ```rust
//! use tabscrape::transform::{HtmlTable, TablePipeline};
//!
//! let html = "<table><tr><td>Ada Lovelace</td><td>a=1;b=2</td></tr></table>";
//! let table = HtmlTable::new(html, "table", "tr").unwrap();
//!
//! let pipeline = TablePipeline::new(&[
//!     Some(r"first,,last[[(\w+) (\w+)]]"),
//!     Some(r"attrs{{;}}<<(\w)=(\d)>>"),
//! ])
//! .unwrap();
//!
//! let records = pipeline.run(&table, None).unwrap();
//! assert_eq!(records[0]["last"], "Lovelace");
//! assert_eq!(records[0]["attrs"]["b"], "2");
//! ```

use std::sync::Arc;

use super::dsl::{assemble_rows, compile_headers, HeaderSpec};
use super::table::{RawCell, TableSource};
use crate::error::{HeaderResult, PipelineResult};
use crate::models::{Cell, Record};
use crate::trace::{emit, LogEntry, Tracer};

/// Per-cell hook: `(column_index, raw_markup, sanitized_text) -> text`.
///
/// Returning the raw markup unchanged keeps the sanitized text.
pub type CellProcessor = dyn Fn(usize, &str, &str) -> String + Send + Sync;

/// Compiled headers plus an optional cell processor.
pub struct TablePipeline {
    specs: Arc<Vec<Option<HeaderSpec>>>,
    processor: Option<Box<CellProcessor>>,
}

impl TablePipeline {
    /// Compile `templates` into a new pipeline.
    pub fn new<S: AsRef<str>>(templates: &[Option<S>]) -> HeaderResult<Self> {
        Ok(Self::from_specs(Arc::new(compile_headers(templates)?)))
    }

    /// Reuse specs compiled elsewhere, e.g. from a [`crate::cache::SpecCache`].
    pub fn from_specs(specs: Arc<Vec<Option<HeaderSpec>>>) -> Self {
        Self { specs, processor: None }
    }

    /// Install a cell processor.
    pub fn with_processor<F>(mut self, processor: F) -> Self
    where
        F: Fn(usize, &str, &str) -> String + Send + Sync + 'static,
    {
        self.processor = Some(Box::new(processor));
        self
    }

    /// Compiled specs
    pub fn specs(&self) -> &[Option<HeaderSpec>] {
        &self.specs
    }

    /// Turn raw cells into assembler input, applying the processor.
    pub fn cells(&self, raw: &[RawCell]) -> Vec<Cell> {
        raw.iter()
            .enumerate()
            .map(|(idx, cell)| {
                let text = match &self.processor {
                    Some(process) => {
                        let out = process(idx, &cell.markup, &cell.text);
                        if out != cell.markup {
                            out
                        } else {
                            cell.text.clone()
                        }
                    }
                    None => cell.text.clone(),
                };
                Cell::Text(text)
            })
            .collect()
    }

    /// Run over every row of `source`.
    ///
    /// Output order follows the source. A transform mismatch aborts the run.
    pub fn run(&self, source: &dyn TableSource, tracer: Option<&dyn Tracer>) -> PipelineResult<Vec<Record>> {
        let raw_rows = source.raw_rows()?;
        emit(tracer, LogEntry::info(format!("Read {} rows", raw_rows.len())));

        let rows: Vec<Vec<Cell>> = raw_rows.iter().map(|raw| self.cells(raw)).collect();
        let records = assemble_rows(&rows, &self.specs, tracer)?;

        emit(tracer, LogEntry::success(format!("Assembled {} records", records.len())));
        Ok(records)
    }
}

/// Compile `templates` and run them over `source` once.
pub fn table_to_records<S: AsRef<str>>(
    source: &dyn TableSource,
    templates: &[Option<S>],
    tracer: Option<&dyn Tracer>,
) -> PipelineResult<Vec<Record>> {
    let pipeline = TablePipeline::new(templates)?;
    for spec in pipeline.specs().iter().flatten() {
        emit(
            tracer,
            LogEntry::info(format!("{} → {}", spec.template, spec.kind_label())).with_indent(1),
        );
    }
    pipeline.run(source, tracer)
}
