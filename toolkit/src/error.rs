//! Error types for the tabscrape toolkit.
//!
//! One error enum per concern:
//!
//! - [`HeaderError`] - header template compilation errors
//! - [`TransformError`] - row assembly errors (fatal for the batch)
//! - [`CsvError`] - CSV document construction and write errors
//! - [`ParseError`] - delimited text parsing errors
//! - [`FetchError`] - page fetch and page cache errors
//! - [`ConfigError`] - job file errors
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Header Template Errors
// =============================================================================

/// Errors while compiling header templates.
#[derive(Debug, Error)]
pub enum HeaderError {
    /// A regex inside a bracket pair failed to compile.
    #[error("Invalid pattern in header template '{template}': {source}")]
    Pattern {
        template: String,
        #[source]
        source: regex::Error,
    },
}

// =============================================================================
// Row Assembly Errors
// =============================================================================

/// Errors while assembling records from rows.
///
/// Only transform mismatches are errors; multi and split mismatches
/// degrade inside the record instead.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A transform column did not match its pattern. Aborts the whole batch.
    #[error("Row {row}, column '{field}': value '{value}' does not match /{pattern}/")]
    FatalValidation {
        row: usize,
        field: String,
        pattern: String,
        value: String,
    },
}

// =============================================================================
// CSV Document Errors
// =============================================================================

/// Errors while building or writing a CSV document.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Entry length (or object key count) differs from the header count.
    #[error("Expected {expected} fields, got {actual}")]
    Cardinality { expected: usize, actual: usize },

    /// Object key that is not one of the document headers.
    #[error("Unknown field '{0}'")]
    UnknownField(String),

    /// Unrecognized formatting option name or unusable option value.
    #[error("Invalid CSV option: {0}")]
    Configuration(String),

    /// Writing the serialized document failed.
    #[error("Failed to write CSV: {0}")]
    Write(#[from] std::io::Error),
}

// =============================================================================
// Delimited Text Errors
// =============================================================================

/// Errors while reading delimited text.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed delimited content.
    #[error("Line {line}: {message}")]
    Malformed { line: usize, message: String },

    /// Empty input.
    #[error("Input is empty")]
    EmptyFile,
}

// =============================================================================
// Fetch Errors
// =============================================================================

/// Errors from the page fetcher and its cache.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    /// Cache IO error.
    #[error("Page cache IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Cache entry could not be (de)serialized.
    #[error("Page cache JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while loading a job file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the job file.
    #[error("Failed to read job file: {0}")]
    Io(#[from] std::io::Error),

    /// Job file is not valid JSON for a job.
    #[error("Invalid job file: {0}")]
    Json(#[from] serde_json::Error),

    /// CSS selector could not be parsed.
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level orchestration errors.
///
/// This is the error type returned by [`crate::job::run_job`] and the
/// table pipeline entry points. It wraps all lower-level errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Header template error.
    #[error("Header error: {0}")]
    Header(#[from] HeaderError),

    /// Row assembly error.
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// CSV document error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Delimited text error.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Fetch error.
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// No table matched the table selector.
    #[error("No table matches '{0}'")]
    TableNotFound(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for header compilation.
pub type HeaderResult<T> = Result<T, HeaderError>;

/// Result type for row assembly.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for delimited text parsing.
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // CsvError -> PipelineError
        let csv_err = CsvError::UnknownField("price".into());
        let pipeline_err: PipelineError = csv_err.into();
        assert!(pipeline_err.to_string().contains("price"));

        // TransformError -> PipelineError
        let transform_err = TransformError::FatalValidation {
            row: 3,
            field: "year".into(),
            pattern: r"(\d{4})".into(),
            value: "n/a".into(),
        };
        let pipeline_err: PipelineError = transform_err.into();
        let msg = pipeline_err.to_string();
        assert!(msg.contains("Row 3"));
        assert!(msg.contains("n/a"));
    }

    #[test]
    fn test_cardinality_format() {
        let err = CsvError::Cardinality { expected: 3, actual: 2 };
        assert_eq!(err.to_string(), "Expected 3 fields, got 2");
    }

    #[test]
    fn test_pattern_error_names_template() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = HeaderError::Pattern {
            template: "year//(\\".into(),
            source,
        };
        assert!(err.to_string().contains("year//("));
    }
}
