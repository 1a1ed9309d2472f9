//! Common display utilities and helpers

/// Truncate string to max length (in characters) with ellipsis
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Render a status string as an upper-case label
pub fn status_label(status: &str) -> String {
    status.replace(['_', '-'], " ").to_uppercase()
}

/// Render a boolean as yes/no
pub fn yes_no(value: bool) -> String {
    if value { "yes" } else { "no" }.to_string()
}
