//! Transformation module.
//!
//! This module turns table rows into records:
//! - DSL: header templates and the row assembler
//! - Table: HTML and delimited-text table sources
//! - Pipeline: sources through the assembler

pub mod dsl;
pub mod pipeline;
pub mod table;

pub use dsl::*;
pub use pipeline::{table_to_records, CellProcessor, TablePipeline};
pub use table::{sanitize_text, DelimitedTable, HtmlTable, RawCell, TableSource, DEFAULT_ROW_SELECTOR};
