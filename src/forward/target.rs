//! Target URL construction.

/// Join a backend base address and a sub-path.
///
/// Trailing slashes on `base` are dropped. A non-empty `sub_path` is appended
/// after a single `/`; an empty one leaves the trimmed base unchanged, so the
/// result never ends in a slash the caller did not ask for.
pub fn target_url(base: &str, sub_path: &str) -> String {
    let base = base.trim_end_matches('/');
    if sub_path.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{sub_path}")
    }
}

/// Append a raw query string to `url`, unchanged.
pub fn with_query(url: &str, query: Option<&str>) -> String {
    match query {
        Some(query) => format!("{url}?{query}"),
        None => url.to_string(),
    }
}
