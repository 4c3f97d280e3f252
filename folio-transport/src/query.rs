//! URL path and query-string assembly.

use crate::request::UrlParams;

/// Normalizes a path to start with exactly one `/`.
pub fn normalize_path(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

/// Builds a `?`-prefixed, `&`-joined, URL-encoded query string.
///
/// List values expand into repeated `key=value` pairs. An empty mapping
/// (or one holding only empty lists) yields an empty string.
pub fn build_query(params: &UrlParams) -> String {
    let pairs: Vec<String> = params
        .iter()
        .flat_map(|(key, value)| {
            value
                .to_query_values()
                .into_iter()
                .map(move |v| format!("{}={}", urlencoding::encode(key), urlencoding::encode(&v)))
        })
        .collect();

    if pairs.is_empty() {
        String::new()
    } else {
        format!("?{}", pairs.join("&"))
    }
}

/// Appends a query string built by [`build_query`] to a URL.
///
/// URLs that already carry a query get the new pairs joined with `&`.
pub fn append_query(url: &str, query: &str) -> String {
    match query.strip_prefix('?') {
        None => url.to_string(),
        Some(pairs) if url.contains('?') => format!("{url}&{pairs}"),
        Some(_) => format!("{url}{query}"),
    }
}

// ============================================================================
// Tests
// ============================================================================
