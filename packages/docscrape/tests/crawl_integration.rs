//! End-to-end crawl tests driving the full pipeline against mocks.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use docscrape::testing::{MockApiCall, MockCleaner, MockScrapeApi};
use docscrape::{
    CrawlError, CrawlJob, Crawler, Manifest, PageStatus, RetryPolicy, ScrapedPage,
};

fn page(url: &str, markdown: &str) -> ScrapedPage {
    ScrapedPage::new(url)
        .with_markdown(markdown)
        .with_title(markdown.trim_start_matches('#').trim())
}

fn docs_example_api() -> MockScrapeApi {
    MockScrapeApi::new()
        .with_site_map([
            "https://docs.example.com/",
            "https://docs.example.com/docs/intro",
            "https://docs.example.com/blog/post1",
        ])
        .with_pages([
            page("https://docs.example.com/", "# Home"),
            page("https://docs.example.com/docs/intro", "# Intro"),
            page("https://docs.example.com/blog/post1", "# Post"),
        ])
}

fn read_manifest(dir: &Path) -> Manifest {
    let json = fs::read_to_string(dir.join("manifest.json")).unwrap();
    serde_json::from_str(&json).unwrap()
}

/// Every manifest success maps to a file on disk, every failure to no
/// file, and no markdown file exists without a manifest entry.
fn assert_manifest_matches_disk(dir: &Path, manifest: &Manifest) {
    let mut expected_files = vec!["manifest.json".to_string()];
    for (url, entry) in &manifest.pages {
        match &entry.status {
            PageStatus::Fetched => {
                let file = entry
                    .file
                    .as_ref()
                    .unwrap_or_else(|| panic!("fetched page {url} has no file"));
                assert!(dir.join(file).exists(), "{file} missing for {url}");
                expected_files.push(file.clone());
                if let Some(html_file) = &entry.html_file {
                    assert!(dir.join(html_file).exists(), "{html_file} missing for {url}");
                }
            }
            PageStatus::Failed { .. } => {
                assert!(entry.file.is_none(), "failed page {url} claims a file");
            }
        }
    }

    for dirent in fs::read_dir(dir).unwrap() {
        let dirent = dirent.unwrap();
        if dirent.file_type().unwrap().is_dir() {
            continue; // html/ mirror checked via entries above
        }
        let name = dirent.file_name().to_string_lossy().to_string();
        assert!(expected_files.contains(&name), "orphan file {name} on disk");
    }
}

#[tokio::test]
async fn full_crawl_accepts_docs_and_rejects_blog() {
    let dir = TempDir::new().unwrap();
    let api = docs_example_api();
    let cleaner = MockCleaner::new();

    let job = CrawlJob::new("https://docs.example.com")
        .unwrap()
        .with_output_dir(dir.path())
        .with_keep_html(false);
    let summary = Crawler::new(&api, &cleaner).run(&job).await.unwrap();

    assert_eq!(summary.pages_written, 2);
    assert_eq!(summary.pages_failed, 0);

    let manifest = read_manifest(dir.path());
    assert_eq!(manifest.domain, "docs.example.com");
    assert_eq!(manifest.pages.len(), 2);
    assert!(manifest.pages.contains_key("https://docs.example.com/"));
    assert!(manifest
        .pages
        .contains_key("https://docs.example.com/docs/intro"));
    assert!(!manifest
        .pages
        .contains_key("https://docs.example.com/blog/post1"));

    // The rejected blog URL was never even scraped
    assert_eq!(api.scrape_call_count("https://docs.example.com/blog/post1"), 0);

    assert!(dir.path().join("index.md").exists());
    assert!(dir.path().join("docs-intro.md").exists());
    assert_manifest_matches_disk(dir.path(), &manifest);
}

#[tokio::test]
async fn failed_pages_are_recorded_not_dropped() {
    let dir = TempDir::new().unwrap();
    let api = MockScrapeApi::new()
        .with_site_map([
            "https://docs.example.com/",
            "https://docs.example.com/docs/a",
            "https://docs.example.com/docs/b",
        ])
        .with_pages([
            page("https://docs.example.com/", "# Home"),
            page("https://docs.example.com/docs/a", "# A"),
        ])
        .fail_url("https://docs.example.com/docs/b");
    let cleaner = MockCleaner::new();

    let job = CrawlJob::new("https://docs.example.com")
        .unwrap()
        .with_output_dir(dir.path())
        .with_keep_html(false);
    let summary = Crawler::new(&api, &cleaner).run(&job).await.unwrap();

    assert_eq!(summary.pages_written, 2);
    assert_eq!(summary.pages_failed, 1);

    let manifest = read_manifest(dir.path());
    assert_eq!(manifest.pages.len(), 3);
    let failed = &manifest.pages["https://docs.example.com/docs/b"];
    assert!(matches!(failed.status, PageStatus::Failed { .. }));
    assert_manifest_matches_disk(dir.path(), &manifest);
}

#[tokio::test]
async fn test_mode_writes_at_most_ten_pages() {
    let dir = TempDir::new().unwrap();
    let urls: Vec<String> = (0..50)
        .map(|i| format!("https://docs.example.com/docs/page{i:02}"))
        .collect();
    let pages: Vec<ScrapedPage> = urls
        .iter()
        .map(|u| page(u, "# Page"))
        .chain(std::iter::once(page("https://docs.example.com/", "# Home")))
        .collect();
    let api = MockScrapeApi::new().with_site_map(urls).with_pages(pages);
    let cleaner = MockCleaner::new();

    let job = CrawlJob::new("https://docs.example.com")
        .unwrap()
        .with_output_dir(dir.path())
        .with_test_mode(true)
        .with_keep_html(false);
    Crawler::new(&api, &cleaner).run(&job).await.unwrap();

    let manifest = read_manifest(dir.path());
    assert!(manifest.pages.len() <= 10, "got {}", manifest.pages.len());
    assert_manifest_matches_disk(dir.path(), &manifest);
}

#[tokio::test]
async fn single_page_mode_skips_site_mapping() {
    let dir = TempDir::new().unwrap();
    let api = docs_example_api();
    let cleaner = MockCleaner::new();

    let job = CrawlJob::new("https://docs.example.com")
        .unwrap()
        .with_output_dir(dir.path())
        .single_page()
        .with_keep_html(false);
    let summary = Crawler::new(&api, &cleaner).run(&job).await.unwrap();

    assert_eq!(summary.pages_written, 1);
    assert!(!api
        .calls()
        .iter()
        .any(|c| matches!(c, MockApiCall::MapSite { .. })));

    let manifest = read_manifest(dir.path());
    assert_eq!(manifest.pages.len(), 1);
    assert!(dir.path().join("index.md").exists());
}

#[tokio::test]
async fn site_map_failure_aborts_with_no_manifest() {
    let dir = TempDir::new().unwrap();
    let api = MockScrapeApi::new().fail_map();
    let cleaner = MockCleaner::new();

    let job = CrawlJob::new("https://docs.example.com")
        .unwrap()
        .with_output_dir(dir.path());
    let err = Crawler::new(&api, &cleaner).run(&job).await.unwrap_err();

    assert!(matches!(err, CrawlError::SiteMapFailed(_)));
    assert!(!dir.path().join("manifest.json").exists());
}

#[tokio::test]
async fn rate_limited_page_is_retried_to_success() {
    let dir = TempDir::new().unwrap();
    let api = docs_example_api().rate_limit_url("https://docs.example.com/docs/intro", 2);
    let cleaner = MockCleaner::new();

    let job = CrawlJob::new("https://docs.example.com")
        .unwrap()
        .with_output_dir(dir.path())
        .with_keep_html(false);
    let summary = Crawler::new(&api, &cleaner)
        .with_policy(RetryPolicy::immediate(5))
        .run(&job)
        .await
        .unwrap();

    assert_eq!(summary.pages_failed, 0);
    assert_eq!(api.scrape_call_count("https://docs.example.com/docs/intro"), 3);
}

#[tokio::test]
async fn html_mirror_is_written_when_kept() {
    let dir = TempDir::new().unwrap();
    let api = MockScrapeApi::new()
        .with_site_map(["https://docs.example.com/docs/a"])
        .with_pages([
            page("https://docs.example.com/", "# Home").with_html("<h1>Home</h1>"),
            page("https://docs.example.com/docs/a", "# A").with_html("<h1>A</h1>"),
        ]);
    let cleaner = MockCleaner::new();

    let job = CrawlJob::new("https://docs.example.com")
        .unwrap()
        .with_output_dir(dir.path());
    Crawler::new(&api, &cleaner).run(&job).await.unwrap();

    assert!(dir.path().join("html/index.html").exists());
    assert!(dir.path().join("html/docs-a.html").exists());

    let manifest = read_manifest(dir.path());
    assert_eq!(
        manifest.pages["https://docs.example.com/"]
            .html_file
            .as_deref(),
        Some("html/index.html")
    );
    assert_manifest_matches_disk(dir.path(), &manifest);
}

#[tokio::test]
async fn cleaning_pipes_markdown_through_the_model() {
    let dir = TempDir::new().unwrap();
    let api = MockScrapeApi::new()
        .with_site_map(["https://docs.example.com/docs/a"])
        .with_pages([
            page("https://docs.example.com/", "# Home"),
            page("https://docs.example.com/docs/a", "# A\n\n[Skip to navigation]"),
        ]);
    let cleaner = MockCleaner::new().with_response("# A\n\n[Skip to navigation]", "# A");

    let job = CrawlJob::new("https://docs.example.com")
        .unwrap()
        .with_output_dir(dir.path())
        .with_keep_html(false)
        .with_clean(true);
    Crawler::new(&api, &cleaner).run(&job).await.unwrap();

    assert_eq!(
        fs::read_to_string(dir.path().join("docs-a.md")).unwrap(),
        "# A"
    );
    // Both pages went through the cleaner
    assert_eq!(cleaner.calls().len(), 2);
}

#[tokio::test]
async fn rerun_into_fresh_directory_is_idempotent() {
    let api = docs_example_api();
    let cleaner = MockCleaner::new();

    let mut mappings = Vec::new();
    for _ in 0..2 {
        let dir = TempDir::new().unwrap();
        let job = CrawlJob::new("https://docs.example.com")
            .unwrap()
            .with_output_dir(dir.path())
            .with_keep_html(false);
        Crawler::new(&api, &cleaner).run(&job).await.unwrap();

        let manifest = read_manifest(dir.path());
        let mapping: Vec<(String, Option<String>)> = manifest
            .pages
            .iter()
            .map(|(url, entry)| (url.clone(), entry.file.clone()))
            .collect();
        mappings.push(mapping);
    }

    assert_eq!(mappings[0], mappings[1]);
}
