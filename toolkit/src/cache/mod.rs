//! Spec Cache - compile each header template set once
//!
//! Compiled specs are immutable and handed out behind an `Arc`, so one
//! compiled set can serve any number of batches and threads.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::HeaderResult;
use crate::transform::dsl::{compile_headers, HeaderSpec};

/// Key of a template set: the templates in column order, `None` for skipped columns
pub type TemplateKey = Vec<Option<String>>;

/// A compiled template set and how often it was reused
#[derive(Debug, Clone)]
pub struct CachedSpecs {
    /// Compiled specs, index-aligned with the templates
    pub specs: Arc<Vec<Option<HeaderSpec>>>,
    /// Number of lookups served from the cache
    pub hits: u32,
}

/// Cache of compiled header template sets
#[derive(Debug, Default)]
pub struct SpecCache {
    entries: HashMap<TemplateKey, CachedSpecs>,
}

impl SpecCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the compiled specs for `templates`, compiling them on first use.
    ///
    /// Compilation errors are not cached.
    pub fn get_or_compile<S: AsRef<str>>(&mut self, templates: &[Option<S>]) -> HeaderResult<Arc<Vec<Option<HeaderSpec>>>> {
        let key: TemplateKey = templates
            .iter()
            .map(|t| t.as_ref().map(|s| s.as_ref().to_string()))
            .collect();

        if let Some(entry) = self.entries.get_mut(&key) {
            entry.hits += 1;
            return Ok(Arc::clone(&entry.specs));
        }

        let specs = Arc::new(compile_headers(templates)?);
        self.entries.insert(
            key,
            CachedSpecs {
                specs: Arc::clone(&specs),
                hits: 0,
            },
        );
        Ok(specs)
    }

    /// All cached entries
    pub fn list(&self) -> Vec<(&TemplateKey, &CachedSpecs)> {
        self.entries.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups served without compiling, over all sets
    pub fn total_hits(&self) -> u32 {
        self.entries.values().map(|e| e.hits).sum()
    }
}
