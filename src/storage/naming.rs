/// Maps arbitrary text to a safe file name
///
/// Keeps alphanumeric characters, space, `-` and `_` (and `.` when
/// `allow_dot` is set), trims trailing whitespace, then replaces spaces with
/// underscores.
///
/// # Examples
///
/// ```
/// use exchange_export::storage::sanitize_filename;
///
/// assert_eq!(sanitize_filename("Content Paged", true), "Content_Paged");
/// assert_eq!(sanitize_filename("v1.0: Notes?", false), "v10_Notes");
/// ```
pub fn sanitize_filename(text: &str, allow_dot: bool) -> String {
    let kept: String = text
        .chars()
        .filter(|&c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_') || (allow_dot && c == '.'))
        .collect();

    kept.trim_end().replace(' ', "_")
}

/// Last `/`-separated segment of a page path
pub fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
