//! Small string and URL helpers shared by the scrapers and the history store

use url::Url;

/// Drop everything from the first `?` onwards
pub fn strip_query(link: &str) -> &str {
    link.split_once('?').map_or(link, |(base, _)| base)
}

/// Trim and collapse runs of whitespace to a single space, like rendered text
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapse whitespace within each line and drop blank lines
pub fn collapse_lines(text: &str) -> String {
    text.lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Resolve an `href`/`src` attribute against the page it was found on.
/// Unresolvable values are returned trimmed but otherwise untouched.
pub fn resolve_url(base: &Url, value: &str) -> String {
    let value = value.trim();
    base.join(value)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| value.to_string())
}
