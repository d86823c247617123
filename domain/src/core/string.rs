//! String utilities for the domain layer.

/// Truncate a string to a maximum byte length with an ellipsis marker.
///
/// `max_len` is a byte budget; the cut always lands on a valid UTF-8
/// character boundary. Used for the document excerpt budget and for
/// trimming long argument text in log lines.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let target = max_len.saturating_sub(3);
        let mut end = target.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

/// Collapse a multi-line string into a single truncated line.
///
/// Log-line preview of argument content: newlines become spaces, runs of
/// whitespace collapse, then the result is truncated to `max_len`.
pub fn preview(s: &str, max_len: usize) -> String {
    let flat = s.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate(&flat, max_len)
}
