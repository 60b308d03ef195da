//! Header template DSL
//!
//! This module provides:
//! - `header`: compile header templates into column specs
//! - `assembler`: apply compiled specs to row cells
//!
//! ## Usage Flow
//!
//! ```text
//! templates → header::compile_headers → assembler::assemble_row (per row) → Record
//! ```
//!
//! ## Example
//!
//! ```rust
//! use tabscrape::transform::dsl::{assemble_row, compile_headers};
//! use tabscrape::Cell;
//!
//! let specs = compile_headers(&[Some(r"year//(\d{4})\\"), Some("title")]).unwrap();
//! let row = vec![Cell::from("May 1999"), Cell::from("The Matrix")];
//! let record = assemble_row(&row, &specs, 0).unwrap();
//!
//! assert_eq!(record["year"], "1999");
//! assert_eq!(record["title"], "The Matrix");
//! ```

pub mod assembler;
pub mod header;

// Re-exports for convenience
pub use assembler::{assemble_row, assemble_rows};
pub use header::{compile_headers, grammar_description, output_fields, HeaderSpec, SpecKind};
