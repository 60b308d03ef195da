//! # tabscrape - ragged tables in, records and CSV out
//!
//! tabscrape turns scraped tables whose cells pack several values into
//! structured records, driven by small rules embedded in the header names,
//! and flattens records holding lists back into CSV row blocks.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ HTML / CSV  │────▶│ Table source│────▶│  Assembler  │────▶│   Records   │
//! │  (fetched)  │     │ (raw cells) │     │ (templates) │     │   (JSON)    │
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                                    │
//!                     ┌─────────────┐     ┌─────────────┐            │
//!                     │  CSV text   │◀────│  Expander   │◀───────────┘
//!                     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use tabscrape::{records_to_document, CsvOptions, DelimitedTable, TablePipeline};
//!
//! let table = DelimitedTable::new(vec![vec!["Ada Lovelace".into(), "math; poetry".into()]]);
//! let pipeline = TablePipeline::new(&[Some(r"name//^(\w+)\\"), Some(r"topics{{\s*;\s*}}")]).unwrap();
//! let records = pipeline.run(&table, None).unwrap();
//!
//! let csv = records_to_document(&records, CsvOptions::default()).unwrap();
//! assert_eq!(csv.to_string(), "\"name\",\"topics\"\n\"Ada\",\"math\"\n\"\",\"poetry\"");
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per concern
//! - [`models`] - Cells and records
//! - [`transform`] - Header templates, assembler, table sources, pipeline
//! - [`export`] - Row expansion and CSV documents
//! - [`cache`] - Compiled template reuse
//! - [`parser`] - Delimited text input
//! - [`fetch`] - HTTP fetch with page cache
//! - [`job`] - JSON job files
//! - [`trace`] - Optional logging hook

// Core modules
pub mod error;
pub mod models;

// Transformation
pub mod transform;

// CSV output
pub mod export;

// Caching
pub mod cache;

// Input
pub mod fetch;
pub mod parser;

// Orchestration
pub mod job;

// Observability
pub mod trace;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ConfigError, CsvError, FetchError, HeaderError, ParseError, PipelineError, TransformError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Cell, Record, Row};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    assemble_row,
    assemble_rows,
    compile_headers,
    grammar_description,
    output_fields,
    table_to_records,
    DelimitedTable,
    HeaderSpec,
    HtmlTable,
    RawCell,
    SpecKind,
    TablePipeline,
    TableSource,
};

// =============================================================================
// Re-exports - Export
// =============================================================================

pub use export::{expand_entry, records_to_document, CsvDocument, CsvOptions};

// =============================================================================
// Re-exports - Cache, input, jobs, tracing
// =============================================================================

pub use cache::SpecCache;
pub use fetch::{Fetcher, PageCache};
pub use job::{run_job, JobResult, TableJob};
pub use parser::{parse_bytes_auto, parse_file, parse_file_auto, parse_str, ParsedTable};
pub use trace::{ConsoleTracer, LogEntry, LogLevel, MemoryTracer, Tracer};
