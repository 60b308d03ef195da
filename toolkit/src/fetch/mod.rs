//! Page fetcher with an on-disk cache
//!
//! Each fetched page is stored as one JSON file named after a slug of its URL.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{FetchError, FetchResult};
use crate::trace::{emit, LogEntry, Tracer};

/// Directory where pages are cached (relative to current dir)
pub const DEFAULT_CACHE_DIR: &str = ".tabscrape/pages";

/// Environment variable overriding [`DEFAULT_CACHE_DIR`]
pub const CACHE_DIR_ENV: &str = "TABSCRAPE_CACHE_DIR";

/// Environment variable overriding the fetch user agent
pub const USER_AGENT_ENV: &str = "TABSCRAPE_USER_AGENT";

const DEFAULT_USER_AGENT: &str = concat!("tabscrape/", env!("CARGO_PKG_VERSION"));

/// A cached page with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedPage {
    /// Slug identifier, also the file stem
    pub id: String,
    /// Source URL
    pub url: String,
    /// Response body
    pub body: String,
    /// Fetch timestamp (RFC 3339)
    pub fetched_at: String,
}

/// On-disk page cache
pub struct PageCache {
    dir: PathBuf,
}

impl PageCache {
    /// Cache in `TABSCRAPE_CACHE_DIR`, or the default directory
    pub fn from_env() -> Self {
        let dir = std::env::var(CACHE_DIR_ENV).unwrap_or_else(|_| DEFAULT_CACHE_DIR.to_string());
        Self::with_dir(dir)
    }

    /// Cache in a custom directory
    pub fn with_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cached page for `url`, if any. Unreadable entries count as misses.
    pub fn get(&self, url: &str) -> Option<CachedPage> {
        let content = fs::read_to_string(self.path_for(url)).ok()?;
        serde_json::from_str::<CachedPage>(&content)
            .ok()
            .filter(|page| page.url == url)
    }

    /// Store a page body for `url`
    pub fn store(&self, url: &str, body: &str) -> FetchResult<CachedPage> {
        fs::create_dir_all(&self.dir)?;

        let page = CachedPage {
            id: slug(url),
            url: url.to_string(),
            body: body.to_string(),
            fetched_at: chrono::Utc::now().to_rfc3339(),
        };
        fs::write(self.path_for(url), serde_json::to_string_pretty(&page)?)?;
        Ok(page)
    }

    /// Drop the cached page for `url`; returns whether one existed
    pub fn remove(&self, url: &str) -> FetchResult<bool> {
        let path = self.path_for(url);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        Ok(true)
    }

    /// All readable cached pages
    pub fn list(&self) -> Vec<CachedPage> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(e) => e,
            Err(_) => return Vec::new(),
        };

        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|e| e == "json"))
            .filter_map(|path| fs::read_to_string(path).ok())
            .filter_map(|content| serde_json::from_str(&content).ok())
            .collect()
    }

    fn path_for(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}.json", slug(url)))
    }
}

/// File-name-safe identifier for a URL
fn slug(url: &str) -> String {
    url.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// HTTP fetcher backed by a [`PageCache`]
pub struct Fetcher {
    client: reqwest::Client,
    cache: PageCache,
}

impl Fetcher {
    pub fn new(cache: PageCache) -> FetchResult<Self> {
        let user_agent = std::env::var(USER_AGENT_ENV).unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string());
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client, cache })
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    /// Page body for `url`, from the cache unless `refresh` is set.
    pub async fn fetch(&self, url: &str, refresh: bool, tracer: Option<&dyn Tracer>) -> FetchResult<String> {
        if !refresh {
            if let Some(page) = self.cache.get(url) {
                emit(tracer, LogEntry::info(format!("Cache hit for {} ({})", url, page.fetched_at)));
                return Ok(page.body);
            }
        }

        emit(tracer, LogEntry::info(format!("Fetching {}", url)));
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        self.cache.store(url, &body)?;
        emit(tracer, LogEntry::success(format!("Fetched {} bytes", body.len())));
        Ok(body)
    }
}
