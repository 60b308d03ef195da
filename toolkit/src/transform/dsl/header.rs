//! Header template compiler
//!
//! A header template names an output field and may carry an extraction rule:
//!
//! | Template | Kind |
//! |----------|------|
//! | `name//pattern\\` | transform: keep capture group 1 |
//! | `a,,b,,c[[pattern]]` | multi: groups 1..N fill the names |
//! | `name{{delimiter}}` | split: list of fragments |
//! | `<<pattern>>` anywhere | map pattern, only used by split |
//! | anything else | plain name |

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{HeaderError, HeaderResult};

static MAP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<<(.+?)>>").expect("map grammar"));
static TRANSFORM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)//(.+)\\\\$").expect("transform grammar"));
static MULTI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\[\[(.+)\]\]$").expect("multi grammar"));
static SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\{\{(.+)\}\}$").expect("split grammar"));

/// Separator between names of a multi template
pub const MULTI_NAME_SEPARATOR: &str = ",,";

/// How a column is turned into record fields
#[derive(Debug, Clone)]
pub enum SpecKind {
    /// Copy the cell as-is
    Norm { name: String },
    /// Keep capture group 1; a non-matching cell aborts the batch
    Transform { name: String, pattern: Regex },
    /// Capture groups 1..N fill `names[0..N-1]`
    Multi { names: Vec<String>, pattern: Regex },
    /// Split the cell into fragments
    Split { name: String, delimiter: Regex },
}

/// One compiled header template
#[derive(Debug, Clone)]
pub struct HeaderSpec {
    /// Template the spec was compiled from
    pub template: String,
    /// Resolved kind
    pub kind: SpecKind,
    /// Key/value pattern. Recorded for every kind, applied only by `Split`
    pub map_pattern: Option<Regex>,
}

impl HeaderSpec {
    /// Compile a single template.
    pub fn parse(template: &str) -> HeaderResult<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|source| HeaderError::Pattern {
                template: template.to_string(),
                source,
            })
        };

        // The map segment composes with every other form, so strip it first
        let (rest, map_pattern) = match MAP_RE.captures(template) {
            Some(caps) => {
                let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
                let mut rest = template.to_string();
                rest.replace_range(whole, "");
                (rest, Some(compile(&caps[1])?))
            }
            None => (template.to_string(), None),
        };

        let kind = if let Some(caps) = TRANSFORM_RE.captures(&rest) {
            SpecKind::Transform {
                name: caps[1].to_string(),
                pattern: compile(&caps[2])?,
            }
        } else if let Some(caps) = MULTI_RE.captures(&rest) {
            SpecKind::Multi {
                names: caps[1].split(MULTI_NAME_SEPARATOR).map(str::to_string).collect(),
                pattern: compile(&caps[2])?,
            }
        } else if let Some(caps) = SPLIT_RE.captures(&rest) {
            SpecKind::Split {
                name: caps[1].to_string(),
                delimiter: compile(&caps[2])?,
            }
        } else {
            SpecKind::Norm { name: rest }
        };

        Ok(Self {
            template: template.to_string(),
            kind,
            map_pattern,
        })
    }

    /// Field names this spec writes into a record, in order
    pub fn field_names(&self) -> Vec<&str> {
        match &self.kind {
            SpecKind::Norm { name }
            | SpecKind::Transform { name, .. }
            | SpecKind::Split { name, .. } => vec![name.as_str()],
            SpecKind::Multi { names, .. } => names.iter().map(String::as_str).collect(),
        }
    }

    /// Short label of the kind, for logs
    pub fn kind_label(&self) -> &'static str {
        match (&self.kind, &self.map_pattern) {
            (SpecKind::Norm { .. }, _) => "norm",
            (SpecKind::Transform { .. }, _) => "transform",
            (SpecKind::Multi { .. }, _) => "multi",
            (SpecKind::Split { .. }, Some(_)) => "split+map",
            (SpecKind::Split { .. }, None) => "split",
        }
    }
}

/// Compile a header template list.
///
/// `None` entries stay `None` so the result is index-aligned with the columns.
pub fn compile_headers<S: AsRef<str>>(templates: &[Option<S>]) -> HeaderResult<Vec<Option<HeaderSpec>>> {
    templates
        .iter()
        .map(|t| t.as_ref().map(|t| HeaderSpec::parse(t.as_ref())).transpose())
        .collect()
}

/// Field names produced by a compiled list, in column order
pub fn output_fields(specs: &[Option<HeaderSpec>]) -> Vec<String> {
    specs
        .iter()
        .flatten()
        .flat_map(|s| s.field_names())
        .map(str::to_string)
        .collect()
}

/// Get a description of the template grammar for `--help` style output
pub fn grammar_description() -> String {
    r#"Header template syntax (first match wins, top to bottom):

| Template              | Kind      | Result                                         |
|-----------------------|-----------|------------------------------------------------|
| name//pattern\\       | transform | capture group 1; a non-matching cell aborts    |
| a,,b,,c[[pattern]]    | multi     | groups 1..N fill a, b, c; no match gives null  |
| name{{delimiter}}     | split     | list of fragments split on the delimiter regex |
| anything else         | norm      | cell copied as-is                              |

A `<<pattern>>` segment may appear anywhere in a template. It is only used by
split columns: every fragment must match it, group 1 becomes a key and group 2
its value. If any fragment fails, the column falls back to the plain list.

Examples:
  year//(\d{4})\\
  first,,last[[(\w+) (\w+)]]
  tags{{\s*;\s*}}
  attrs{{,}}<<(\w+)=(\w+)>>"#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(t: &str) -> HeaderSpec {
        HeaderSpec::parse(t).unwrap()
    }

    #[test]
    fn test_norm() {
        let spec = parse("Title");
        assert!(matches!(spec.kind, SpecKind::Norm { ref name } if name == "Title"));
        assert!(spec.map_pattern.is_none());
    }

    #[test]
    fn test_transform() {
        let spec = parse(r"year//(\d{4})\\");
        match spec.kind {
            SpecKind::Transform { name, pattern } => {
                assert_eq!(name, "year");
                assert_eq!(pattern.as_str(), r"(\d{4})");
            }
            other => panic!("expected transform, got {:?}", other),
        }
    }

    #[test]
    fn test_multi() {
        let spec = parse(r"first,,last[[(\w+) (\w+)]]");
        match spec.kind {
            SpecKind::Multi { names, pattern } => {
                assert_eq!(names, vec!["first", "last"]);
                assert_eq!(pattern.captures_len(), 3);
            }
            other => panic!("expected multi, got {:?}", other),
        }
    }

    #[test]
    fn test_split_with_map() {
        let spec = parse(r"attrs{{,}}<<(\w+)=(\w+)>>");
        assert!(matches!(spec.kind, SpecKind::Split { ref name, .. } if name == "attrs"));
        assert_eq!(spec.map_pattern.as_ref().map(|r| r.as_str()), Some(r"(\w+)=(\w+)"));
        assert_eq!(spec.kind_label(), "split+map");
    }

    #[test]
    fn test_map_embedded_in_split() {
        let spec = parse(r"attrs{{,<<(\w+):(\w+)>>}}");
        match &spec.kind {
            SpecKind::Split { name, delimiter } => {
                assert_eq!(name, "attrs");
                assert_eq!(delimiter.as_str(), ",");
            }
            other => panic!("expected split, got {:?}", other),
        }
        assert!(spec.map_pattern.is_some());
    }

    #[test]
    fn test_map_recorded_on_other_kinds() {
        let spec = parse(r"code//(\d+)\\<<(a)(b)>>");
        assert!(matches!(spec.kind, SpecKind::Transform { .. }));
        assert!(spec.map_pattern.is_some());
        assert_eq!(spec.kind_label(), "transform");

        let spec = parse("plain<<(a)(b)>>");
        assert!(matches!(spec.kind, SpecKind::Norm { ref name } if name == "plain"));
        assert!(spec.map_pattern.is_some());
    }

    #[test]
    fn test_priority_transform_over_split() {
        // Looks like a split too, but transform is checked first
        let spec = parse(r"x{{,}}//(\d)\\");
        assert!(matches!(spec.kind, SpecKind::Transform { ref name, .. } if name == "x{{,}}"));
    }

    #[test]
    fn test_priority_multi_over_split() {
        let spec = parse(r"a{{,}},,b[[(.)(.)]]");
        match spec.kind {
            SpecKind::Multi { names, .. } => assert_eq!(names, vec!["a{{,}}", "b"]),
            other => panic!("expected multi, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_pattern_is_error() {
        let err = HeaderSpec::parse(r"year//(\d{4}\\").unwrap_err();
        assert!(matches!(err, HeaderError::Pattern { ref template, .. } if template == r"year//(\d{4}\\"));
        assert!(HeaderSpec::parse("tags{{[}}").is_err());
        assert!(HeaderSpec::parse("x<<(>>").is_err());
    }

    #[test]
    fn test_compile_keeps_none_positions() {
        let specs = compile_headers(&[Some("a"), None, Some(r"b,,c[[(.)(.)]]")]).unwrap();
        assert_eq!(specs.len(), 3);
        assert!(specs[1].is_none());
        assert_eq!(output_fields(&specs), vec!["a", "b", "c"]);
    }
}
