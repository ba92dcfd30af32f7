//! String utility functions for safe UTF-8 text manipulation

/// Take at most `max_chars` characters from the front of `s`.
///
/// Unlike byte slicing (`&s[..n]`), this never splits a multi-byte UTF-8
/// character. No ellipsis is appended; callers that surface the excerpt
/// show exactly the leading characters of the original.
///
/// # Examples
/// ```
/// use notewise_core::utils::string::excerpt;
///
/// assert_eq!(excerpt("hello world", 5), "hello");
/// assert_eq!(excerpt("hello", 10), "hello");
/// assert_eq!(excerpt("héllo", 2), "hé");
/// ```
pub fn excerpt(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => s[..byte_idx].to_string(),
        None => s.to_string(),
    }
}

/// Remove duplicate strings while keeping first-seen order.
pub fn dedup_preserving_order<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
