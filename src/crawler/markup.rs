//! HTML to Markdown conversion
//!
//! Conversion is compiled in with the `markdown` feature. Without it every
//! call reports the converter as unavailable and the crawler only skips the
//! `.md` rendition.

/// Whether this build can convert HTML to Markdown
pub fn converter_available() -> bool {
    cfg!(feature = "markdown")
}

/// Converts an HTML document to Markdown
///
/// Returns `None` when the converter is not compiled in.
#[cfg(feature = "markdown")]
pub fn html_to_markdown(html: &str) -> Option<String> {
    Some(html2md::parse_html(html))
}

/// Converts an HTML document to Markdown
///
/// Returns `None` when the converter is not compiled in.
#[cfg(not(feature = "markdown"))]
pub fn html_to_markdown(_html: &str) -> Option<String> {
    None
}
