//! UTF-8–safe truncation for content previews.
//!
//! Chapter and article bodies can be megabytes; debug entries carry a short
//! preview. `&str[..n]` panics inside a multi-byte character, so truncation
//! snaps back to the nearest char boundary.

/// Longest prefix of `s` at most `max_bytes` long that does not split a
/// character.
#[inline]
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Collapse whitespace runs and truncate to a preview ending in `…` when the
/// input was longer.
pub fn preview(s: &str, max_bytes: usize) -> String {
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.len() <= max_bytes {
        return collapsed;
    }
    let cut = truncate_str(&collapsed, max_bytes);
    format!("{}…", cut.trim_end())
}
