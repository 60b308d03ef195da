//! Table jobs: a JSON file describing one page → records → CSV run.
//!
//! ```json
//! {
//!   "source": "https://example.com/films",
//!   "table": "table#films",
//!   "rows": "tbody tr",
//!   "headers": ["title", null, "year//(\\d{4})\\\\", "genres{{\\s*,\\s*}}"],
//!   "output": "films.csv",
//!   "csv": { "qualifier": "\"", "delimiter": ";" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cache::SpecCache;
use crate::error::{ConfigError, PipelineResult};
use crate::export::{records_to_document, CsvOptions};
use crate::fetch::Fetcher;
use crate::models::Record;
use crate::trace::{emit, LogEntry, Tracer};
use crate::transform::{HtmlTable, TablePipeline, DEFAULT_ROW_SELECTOR};

/// One scrape job
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableJob {
    /// `http(s)://` URL or path to an HTML file
    pub source: String,

    /// CSS selector of the table; the first match is used
    pub table: String,

    /// CSS selector of the rows inside the table.
    ///
    /// Defaults to `tbody tr`, which leaves out `thead` label rows. A
    /// selector that matches the header row feeds its labels through the
    /// templates, where a transform column aborts the job.
    #[serde(default = "default_rows")]
    pub rows: String,

    /// Header templates, `null` skips a column
    pub headers: Vec<Option<String>>,

    /// Where to write the CSV, if anywhere
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// CSV formatting
    #[serde(default)]
    pub csv: CsvOptions,
}

fn default_rows() -> String {
    DEFAULT_ROW_SELECTOR.to_string()
}

impl TableJob {
    /// Parse a job from JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a job file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Whether the source is fetched over HTTP
    pub fn is_remote(&self) -> bool {
        self.source.starts_with("http://") || self.source.starts_with("https://")
    }
}

/// Outcome of a job
#[derive(Debug, Clone, Serialize)]
pub struct JobResult {
    pub records: Vec<Record>,
    /// CSV file written, if the job has an output
    pub written: Option<PathBuf>,
}

/// Run a job: load the page, assemble records, write the CSV.
///
/// `fetcher` is only needed for remote sources. Jobs sharing `cache` compile
/// each distinct header list once.
pub async fn run_job(
    job: &TableJob,
    fetcher: Option<&Fetcher>,
    cache: &mut SpecCache,
    refresh: bool,
    tracer: Option<&dyn Tracer>,
) -> PipelineResult<JobResult> {
    let html = if job.is_remote() {
        match fetcher {
            Some(f) => f.fetch(&job.source, refresh, tracer).await?,
            None => {
                let fetcher = Fetcher::new(crate::fetch::PageCache::from_env())?;
                fetcher.fetch(&job.source, refresh, tracer).await?
            }
        }
    } else {
        emit(tracer, LogEntry::info(format!("Reading {}", job.source)));
        tokio::fs::read_to_string(&job.source)
            .await
            .map_err(ConfigError::from)?
    };

    let records = extract_records(job, &html, cache, tracer)?;

    let written = match &job.output {
        Some(path) => {
            let doc = records_to_document(&records, job.csv)?;
            doc.write_to(path)?;
            emit(tracer, LogEntry::success(format!("Wrote {}", path.display())));
            Some(path.clone())
        }
        None => None,
    };

    Ok(JobResult { records, written })
}

/// The synchronous part of a job: HTML → records.
pub fn extract_records(
    job: &TableJob,
    html: &str,
    cache: &mut SpecCache,
    tracer: Option<&dyn Tracer>,
) -> PipelineResult<Vec<Record>> {
    let table = HtmlTable::new(html, &job.table, &job.rows)?;
    let pipeline = TablePipeline::from_specs(cache.get_or_compile(&job.headers)?);
    pipeline.run(&table, tracer)
}
