//! Writing the output bundle: per-page files and the crawl manifest.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use url::Url;

use crate::error::{Result, ScrapeError};
use crate::types::{Manifest, ManifestEntry, PageResult, PageStatus};
use crate::urls;

/// Persists page results and accumulates the manifest.
///
/// Every processed URL gets exactly one manifest entry: successes map
/// to files written here, failures are recorded with no file. Once
/// `finalize` runs, the manifest is a complete index of the output
/// directory.
pub struct OutputWriter {
    output_dir: PathBuf,
    manifest: Manifest,
    used_slugs: HashSet<String>,
}

impl OutputWriter {
    /// Create the writer, eagerly creating the output directory so an
    /// unusable path fails before any network activity.
    pub fn create(output_dir: impl Into<PathBuf>, domain: impl Into<String>) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;
        Ok(Self {
            output_dir,
            manifest: Manifest::new(domain),
            used_slugs: HashSet::new(),
        })
    }

    /// Record one page result, writing its files if it succeeded.
    pub fn record(&mut self, result: &PageResult) -> Result<()> {
        match &result.status {
            PageStatus::Failed { reason } => {
                self.manifest
                    .pages
                    .insert(result.url.clone(), ManifestEntry::failed(reason.clone()));
                Ok(())
            }
            PageStatus::Fetched => self.write_page(result),
        }
    }

    fn write_page(&mut self, result: &PageResult) -> Result<()> {
        let slug = self.unique_slug(&result.url);
        let mut entry = ManifestEntry::fetched();

        if let Some(markdown) = &result.markdown {
            let file = format!("{slug}.md");
            fs::write(self.output_dir.join(&file), markdown)?;
            entry.file = Some(file);
        }
        if let Some(html) = &result.html {
            let html_dir = self.output_dir.join("html");
            fs::create_dir_all(&html_dir)?;
            let file = format!("{slug}.html");
            fs::write(html_dir.join(&file), html)?;
            entry.html_file = Some(format!("html/{file}"));
        }

        entry.title = result.title.clone();
        entry.description = result.description.clone();
        self.manifest.pages.insert(result.url.clone(), entry);
        tracing::debug!(url = %result.url, slug, "page written");
        Ok(())
    }

    /// Slug for a URL, suffixed `-2`, `-3`… when an earlier page in
    /// this crawl already claimed it.
    fn unique_slug(&mut self, url: &str) -> String {
        let base = match Url::parse(url) {
            Ok(u) => urls::slug(&u),
            Err(_) => "page".to_string(),
        };
        let mut candidate = base.clone();
        let mut n = 2;
        while !self.used_slugs.insert(candidate.clone()) {
            candidate = format!("{base}-{n}");
            n += 1;
        }
        candidate
    }

    /// Write `manifest.json` and return its path.
    pub fn finalize(self) -> Result<PathBuf> {
        let path = self.output_dir.join("manifest.json");
        let json = serde_json::to_string_pretty(&self.manifest).map_err(ScrapeError::from)?;
        fs::write(&path, json)?;
        tracing::info!(
            manifest = %path.display(),
            pages = self.manifest.pages.len(),
            "manifest written"
        );
        Ok(path)
    }

    /// The manifest accumulated so far.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// The output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Number of successfully written pages so far.
    pub fn pages_written(&self) -> usize {
        self.manifest.fetched_count()
    }

    /// Number of failed pages so far.
    pub fn pages_failed(&self) -> usize {
        self.manifest.failed_count()
    }
}
