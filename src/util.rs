/// Keep at most `max_chars` characters of `s`.
///
/// Counts Unicode scalar values, so multi-byte input is cut on a character
/// boundary and never panics the way `&s[..n]` would.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Truncate a string to `max_chars` characters, appending "..." if truncated.
///
/// Used for log lines, where a long tool argument should stay readable.
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
