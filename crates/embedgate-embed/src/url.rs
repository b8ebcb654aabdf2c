//! Base URL normalization
//!
//! OpenAI-compatible services expect a versioned path segment (`/v1`) under the
//! base URL. Users often paste the bare host, so adapters that follow that
//! convention run the configured base through [`normalize_base_url`] first.

use once_cell::sync::Lazy;
use regex::Regex;

static VERSION_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/v\d+$").expect("version suffix pattern is valid"));

/// Ensure a base URL carries a version segment.
///
/// Appends `/v1` (after stripping trailing slashes) unless the URL path already
/// ends in `/v<digits>` or contains `/v1`. Empty input stays empty.
/// Idempotent: `normalize_base_url(&normalize_base_url(x)) == normalize_base_url(x)`.
pub fn normalize_base_url(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        return String::new();
    }
    let path = &url[path_start(url)..];
    if VERSION_SUFFIX.is_match(path) || path.contains("/v1") {
        return url.to_string();
    }
    format!("{}/v1", url.trim_end_matches('/'))
}

/// Byte offset where the path begins, after any `scheme://host[:port]`.
///
/// Version and API markers are only looked for from here on, so a host such
/// as `v1.proxy.test` never counts as a path segment.
pub(crate) fn path_start(url: &str) -> usize {
    let authority = url.find("://").map(|i| i + 3).unwrap_or(0);
    url[authority..]
        .find('/')
        .map(|i| authority + i)
        .unwrap_or(url.len())
}

/// Join a path suffix onto a base URL without doubling slashes.
pub(crate) fn join(base: &str, suffix: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        suffix.trim_start_matches('/')
    )
}
