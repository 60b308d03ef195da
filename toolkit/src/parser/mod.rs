//! Delimited text reader with encoding and delimiter auto-detection.
//!
//! Produces plain string rows for [`crate::transform::DelimitedTable`].
//! The first line is the header line.

use serde::Serialize;
use std::path::Path;

use crate::error::{ParseError, ParseResult};

/// Parsed delimited text with metadata
#[derive(Debug, Clone, Serialize)]
pub struct ParsedTable {
    /// Header line fields
    pub headers: Vec<String>,
    /// Data rows (header line excluded); lengths may differ
    pub rows: Vec<Vec<String>>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        // UTF-8 and anything unknown: lossy UTF-8
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ';';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse delimited text with an explicit delimiter.
///
/// Blank lines are skipped, fields are trimmed, rows may be ragged.
///
/// # Example
/// ```
/// use tabscrape::parser::parse_str;
///
/// let table = parse_str("name;tags\nAlice;a,b\nBob", ';').unwrap();
///
/// assert_eq!(table.headers, vec!["name", "tags"]);
/// assert_eq!(table.rows[0], vec!["Alice", "a,b"]);
/// assert_eq!(table.rows[1], vec!["Bob"]);
/// ```
pub fn parse_str(content: &str, delimiter: char) -> ParseResult<ParsedTable> {
    parse_with_encoding(content, delimiter, "utf-8".to_string())
}

fn parse_with_encoding(content: &str, delimiter: char, encoding: String) -> ParseResult<ParsedTable> {
    if content.trim().is_empty() {
        return Err(ParseError::EmptyFile);
    }

    let delimiter_byte = u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| ParseError::Malformed {
            line: 0,
            message: format!("delimiter '{}' is not ASCII", delimiter),
        })?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let headers = next_row(&mut records)?.ok_or(ParseError::EmptyFile)?;
    let mut rows = Vec::new();
    while let Some(row) = next_row(&mut records)? {
        rows.push(row);
    }

    Ok(ParsedTable {
        headers,
        rows,
        encoding,
        delimiter,
    })
}

/// Next row with at least one non-empty field.
fn next_row<R: std::io::Read>(records: &mut csv::StringRecordsIter<'_, R>) -> ParseResult<Option<Vec<String>>> {
    for result in records.by_ref() {
        let record = result.map_err(|e| ParseError::Malformed {
            line: e.position().map(|p| p.line() as usize).unwrap_or(0),
            message: e.to_string(),
        })?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        return Ok(Some(record.iter().map(str::to_string).collect()));
    }
    Ok(None)
}

/// Parse bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> ParseResult<ParsedTable> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);
    parse_with_encoding(&content, delimiter, encoding)
}

/// Parse a file with auto-detection of encoding and delimiter.
pub fn parse_file_auto<P: AsRef<Path>>(path: P) -> ParseResult<ParsedTable> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}

/// Parse a file with an explicit delimiter (encoding still detected).
pub fn parse_file<P: AsRef<Path>>(path: P, delimiter: char) -> ParseResult<ParsedTable> {
    let bytes = std::fs::read(path.as_ref())?;
    let encoding = detect_encoding(&bytes);
    let content = decode_content(&bytes, &encoding);
    parse_with_encoding(&content, delimiter, encoding)
}
