//! Pagination defaults and text-search helpers shared by list endpoints.

/// Default number of results per page.
pub const DEFAULT_PAGE_LIMIT: i64 = 20;

/// Maximum number of results per page.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Maximum accepted length of a free-text search term.
pub const MAX_SEARCH_TERM_LENGTH: usize = 100;

/// Clamp a user-provided limit to `[1, max]`, falling back to `default`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// Normalize a free-text search term.
///
/// Trims whitespace, drops empty input, truncates to
/// [`MAX_SEARCH_TERM_LENGTH`] characters.
pub fn normalize_search_term(term: Option<&str>) -> Option<String> {
    let trimmed = term?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_SEARCH_TERM_LENGTH).collect())
}

/// Escape `%`, `_` and `\` so a term matches literally inside `ILIKE`.
///
/// The resulting string is meant to be wrapped as `'%' || $n || '%'`.
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
