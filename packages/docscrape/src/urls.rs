//! URL normalization and output filename slugs.
//!
//! Discovered URLs arrive in whatever shape the scraping API found
//! them; everything downstream (dedup, pattern matching, manifest
//! keys) works on the normalized form.

use percent_encoding::percent_decode_str;
use url::Url;

/// Normalize a URL for deduplication and comparison.
///
/// Forces https, drops query and fragment, and strips the trailing
/// slash from non-root paths. Hosts are already lowercased by the
/// `url` crate. Returns `None` for unparseable URLs, non-http(s)
/// schemes, and URLs without a host.
pub fn normalize(raw: &str) -> Option<Url> {
    let mut url = Url::parse(raw).ok()?;
    url.host_str()?;

    match url.scheme() {
        "https" => {}
        "http" => {
            let _ = url.set_scheme("https");
        }
        _ => return None,
    }

    url.set_fragment(None);
    url.set_query(None);

    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/').to_string();
        url.set_path(&trimmed);
    }

    Some(url)
}

/// Derive the output filename slug for a URL.
///
/// A pure function of the URL path: percent-decoded, slashes replaced
/// with dashes, the bare root mapping to `index`. Re-running a crawl
/// therefore produces identical URL-to-filename mappings.
pub fn slug(url: &Url) -> String {
    let decoded = percent_decode_str(url.path()).decode_utf8_lossy();
    let trimmed = decoded.trim_matches('/');
    if trimmed.is_empty() {
        return "index".to_string();
    }
    trimmed.replace('/', "-")
}
