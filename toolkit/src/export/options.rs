//! CSV formatting options

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CsvError, CsvResult};

/// Formatting options for [`super::CsvDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CsvOptions {
    /// Character wrapped around every field; `None` writes bare fields
    #[serde(
        default = "default_qualifier",
        serialize_with = "serialize_qualifier",
        deserialize_with = "deserialize_qualifier"
    )]
    pub qualifier: Option<char>,

    /// Field separator
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

fn default_qualifier() -> Option<char> {
    Some('"')
}

fn default_delimiter() -> char {
    ','
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            qualifier: default_qualifier(),
            delimiter: default_delimiter(),
        }
    }
}

impl CsvOptions {
    /// Build options from `(name, value)` pairs on top of the defaults.
    ///
    /// Recognized names are `qualifier` (empty or one character) and
    /// `delimiter` (one character).
    pub fn from_pairs<'a, I>(pairs: I) -> CsvResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut options = Self::default();
        for (name, value) in pairs {
            match name {
                "qualifier" => options.qualifier = parse_qualifier(value)?,
                "delimiter" => {
                    options.delimiter = single_char(value).ok_or_else(|| {
                        CsvError::Configuration(format!("delimiter must be one character, got '{}'", value))
                    })?
                }
                other => return Err(CsvError::Configuration(format!("unknown option '{}'", other))),
            }
        }
        Ok(options)
    }

    /// Parse options from a JSON object.
    pub fn from_json(json: &str) -> CsvResult<Self> {
        serde_json::from_str(json).map_err(|e| CsvError::Configuration(e.to_string()))
    }

    pub fn with_qualifier(mut self, qualifier: Option<char>) -> Self {
        self.qualifier = qualifier;
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn parse_qualifier(value: &str) -> CsvResult<Option<char>> {
    if value.is_empty() {
        return Ok(None);
    }
    single_char(value)
        .map(Some)
        .ok_or_else(|| CsvError::Configuration(format!("qualifier must be empty or one character, got '{}'", value)))
}

fn serialize_qualifier<S: Serializer>(qualifier: &Option<char>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&qualifier.map(String::from).unwrap_or_default())
}

fn deserialize_qualifier<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<char>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_qualifier(&raw).map_err(serde::de::Error::custom)
}
