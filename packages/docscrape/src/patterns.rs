//! Documentation URL classification.
//!
//! Pure, table-driven heuristics deciding whether a discovered URL is
//! a documentation page worth crawling. The generic rule matches whole
//! path segments against a fixed keyword set; a small per-domain
//! override table covers documentation platforms with their own
//! routing conventions.

use url::Url;

/// Path segments that mark a URL as documentation.
///
/// Matched as whole segments, so `/api/auth` matches but `/myapidocs/`
/// does not.
const DOC_SEGMENTS: &[&str] = &[
    "docs",
    "documentation",
    "guide",
    "manual",
    "reference",
    "api",
    "learn",
    "tutorial",
    "quickstart",
    "getting-started",
    "examples",
];

/// Extra acceptance rule for a known documentation platform.
enum OverrideRule {
    /// Every path on the site is documentation.
    AllPaths,
    /// Paths whose first segment is one of these are documentation.
    LeadingSegments(&'static [&'static str]),
}

/// Per-domain overrides, keyed by domain suffix.
const SITE_OVERRIDES: &[(&str, OverrideRule)] = &[
    (
        "readthedocs.io",
        OverrideRule::LeadingSegments(&["en", "latest"]),
    ),
    (
        "readthedocs.org",
        OverrideRule::LeadingSegments(&["en", "latest"]),
    ),
    ("github.io", OverrideRule::AllPaths),
    ("react.dev", OverrideRule::AllPaths),
];

/// Classify a URL, returning the tag of the rule that accepted it.
///
/// Rejects any URL on a different host than `root_host` regardless of
/// path. The homepage itself is always accepted. Deterministic and
/// independent of candidate ordering: the keyword set is disjoint, so
/// at most the first matching segment decides the tag.
pub fn classify(url: &Url, root_host: &str) -> Option<&'static str> {
    let host = url.host_str()?;
    if !host.eq_ignore_ascii_case(root_host) {
        return None;
    }

    let segments: Vec<String> = url
        .path_segments()
        .map(|parts| {
            parts
                .filter(|s| !s.is_empty())
                .map(|s| s.to_ascii_lowercase())
                .collect()
        })
        .unwrap_or_default();

    if segments.is_empty() {
        return Some("root");
    }

    for segment in &segments {
        for keyword in DOC_SEGMENTS {
            if segment.as_str() == *keyword {
                return Some(keyword);
            }
        }
    }

    for (suffix, rule) in SITE_OVERRIDES {
        if !host_matches(host, suffix) {
            continue;
        }
        match rule {
            OverrideRule::AllPaths => return Some(suffix),
            OverrideRule::LeadingSegments(leading) => {
                if leading.iter().any(|l| *l == segments[0]) {
                    return Some(suffix);
                }
            }
        }
    }

    None
}

/// Whether a URL should be treated as a documentation page.
pub fn is_doc_url(url: &Url, root_host: &str) -> bool {
    classify(url, root_host).is_some()
}

fn host_matches(host: &str, suffix: &str) -> bool {
    let host = host.to_ascii_lowercase();
    host == suffix || host.ends_with(&format!(".{suffix}"))
}
