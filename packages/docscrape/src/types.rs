//! Crawl data model: jobs, page results, and the output manifest.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

use crate::error::{CrawlError, Result};
use crate::urls;

/// How much of the site a crawl covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlMode {
    /// Map the whole site and crawl every documentation page
    FullSite,
    /// Fetch only the root URL, skipping site discovery
    SinglePage,
}

/// A single crawl invocation. Created once, then immutable.
#[derive(Debug, Clone)]
pub struct CrawlJob {
    /// Normalized root URL of the site
    pub root_url: Url,

    /// Directory the output bundle is written to
    pub output_dir: PathBuf,

    /// Full-site or single-page crawl
    pub mode: CrawlMode,

    /// Reduced-scope crawl for fast validation (at most 10 pages)
    pub test_mode: bool,

    /// Keep a raw HTML mirror alongside the markdown
    pub keep_html: bool,

    /// Pipe fetched markdown through the text-cleaning model
    pub clean: bool,
}

impl CrawlJob {
    /// Create a full-site job for the given root URL.
    ///
    /// The output directory defaults to `<domain>-docs`.
    pub fn new(root_url: &str) -> Result<Self> {
        let root_url = urls::normalize(root_url).ok_or_else(|| CrawlError::InvalidUrl {
            url: root_url.to_string(),
        })?;
        let domain = root_url.host_str().unwrap_or_default().to_string();

        Ok(Self {
            output_dir: PathBuf::from(format!("{domain}-docs")),
            root_url,
            mode: CrawlMode::FullSite,
            test_mode: false,
            keep_html: true,
            clean: false,
        })
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Fetch only the root URL.
    pub fn single_page(mut self) -> Self {
        self.mode = CrawlMode::SinglePage;
        self
    }

    /// Enable or disable test mode.
    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }

    /// Enable or disable the raw HTML mirror.
    pub fn with_keep_html(mut self, keep_html: bool) -> Self {
        self.keep_html = keep_html;
        self
    }

    /// Enable or disable markdown cleaning.
    pub fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    /// Host of the root URL; the crawl never leaves this domain.
    pub fn root_host(&self) -> &str {
        self.root_url.host_str().unwrap_or_default()
    }
}

/// A URL produced by site mapping, with the pattern that accepted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredUrl {
    /// Normalized absolute URL
    pub url: String,

    /// Tag of the matched documentation pattern, if any. `None` means
    /// the URL was kept by the no-match fallback.
    pub matched: Option<&'static str>,
}

/// Outcome of fetching a single page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    Fetched,
    Failed { reason: String },
}

/// One crawled page, successful or not. Failed fetches keep their
/// source URL so they are never silently dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    /// URL the fetch was requested for
    pub url: String,

    /// Page content as markdown
    pub markdown: Option<String>,

    /// Raw HTML, when the job keeps an HTML mirror
    pub html: Option<String>,

    /// Page title from the scrape metadata
    pub title: Option<String>,

    /// Page description from the scrape metadata
    pub description: Option<String>,

    /// When the fetch completed
    pub fetched_at: DateTime<Utc>,

    /// Success or failure
    pub status: PageStatus,
}

impl PageResult {
    /// Create a successful result with no content yet.
    pub fn fetched(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            markdown: None,
            html: None,
            title: None,
            description: None,
            fetched_at: Utc::now(),
            status: PageStatus::Fetched,
        }
    }

    /// Create a failed result, preserving the source URL.
    pub fn failed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            markdown: None,
            html: None,
            title: None,
            description: None,
            fetched_at: Utc::now(),
            status: PageStatus::Failed {
                reason: reason.into(),
            },
        }
    }

    /// Set the markdown content.
    pub fn with_markdown(mut self, markdown: impl Into<String>) -> Self {
        self.markdown = Some(markdown.into());
        self
    }

    /// Set the HTML content.
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether the fetch succeeded.
    pub fn is_fetched(&self) -> bool {
        self.status == PageStatus::Fetched
    }
}

/// Per-URL entry in the crawl manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Markdown file relative to the output directory, for successes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// HTML mirror file relative to the output directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_file: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub status: PageStatus,
}

impl ManifestEntry {
    /// Entry for a successfully fetched page; file paths are filled in
    /// as they are written.
    pub fn fetched() -> Self {
        Self {
            file: None,
            html_file: None,
            title: None,
            description: None,
            status: PageStatus::Fetched,
        }
    }

    /// Entry for a failed page. No file is expected on disk.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            file: None,
            html_file: None,
            title: None,
            description: None,
            status: PageStatus::Failed {
                reason: reason.into(),
            },
        }
    }

    /// Whether this entry records a successful fetch.
    pub fn is_fetched(&self) -> bool {
        self.status == PageStatus::Fetched
    }
}

/// The JSON index of every URL processed in a crawl.
///
/// `IndexMap` keeps entries in processing order so re-runs serialize
/// identically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// When the crawl started
    pub timestamp: DateTime<Utc>,

    /// Base domain the crawl was restricted to
    pub domain: String,

    /// URL → output file and metadata
    pub pages: IndexMap<String, ManifestEntry>,
}

impl Manifest {
    /// Create an empty manifest for a domain, timestamped now.
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            domain: domain.into(),
            pages: IndexMap::new(),
        }
    }

    /// Number of successfully written pages.
    pub fn fetched_count(&self) -> usize {
        self.pages.values().filter(|e| e.is_fetched()).count()
    }

    /// Number of failed pages.
    pub fn failed_count(&self) -> usize {
        self.pages.len() - self.fetched_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_defaults() {
        let job = CrawlJob::new("https://docs.example.com").unwrap();
        assert_eq!(job.root_host(), "docs.example.com");
        assert_eq!(job.output_dir, PathBuf::from("docs.example.com-docs"));
        assert_eq!(job.mode, CrawlMode::FullSite);
        assert!(!job.test_mode);
        assert!(job.keep_html);
        assert!(!job.clean);
    }

    #[test]
    fn job_normalizes_root_url() {
        let job = CrawlJob::new("http://docs.example.com/en/").unwrap();
        assert_eq!(job.root_url.as_str(), "https://docs.example.com/en");
    }

    #[test]
    fn job_rejects_invalid_url() {
        assert!(CrawlJob::new("not a url").is_err());
        assert!(CrawlJob::new("ftp://example.com").is_err());
    }

    #[test]
    fn failed_result_keeps_url() {
        let result = PageResult::failed("https://example.com/docs", "timeout");
        assert_eq!(result.url, "https://example.com/docs");
        assert!(!result.is_fetched());
        assert!(result.markdown.is_none());
    }

    #[test]
    fn manifest_counts() {
        let mut manifest = Manifest::new("example.com");
        manifest
            .pages
            .insert("https://example.com/".into(), ManifestEntry::fetched());
        manifest.pages.insert(
            "https://example.com/docs".into(),
            ManifestEntry::failed("boom"),
        );
        assert_eq!(manifest.fetched_count(), 1);
        assert_eq!(manifest.failed_count(), 1);
    }

    #[test]
    fn manifest_roundtrips_through_json() {
        let mut manifest = Manifest::new("example.com");
        let mut entry = ManifestEntry::fetched();
        entry.file = Some("index.md".into());
        entry.title = Some("Home".into());
        manifest.pages.insert("https://example.com/".into(), entry);

        let json = serde_json::to_string_pretty(&manifest).unwrap();
        let parsed: Manifest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.domain, "example.com");
        assert_eq!(parsed.pages.len(), 1);
        assert!(parsed.pages["https://example.com/"].is_fetched());
    }
}
