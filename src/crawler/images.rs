//! Image reference extraction for portal pages
//!
//! Image tags are found with two independent patterns, one per attribute
//! order, so the result does not depend on alternation order inside a single
//! pattern. Only tags carrying both a non-empty `src` and `alt` are reported.

use crate::config::ImageNaming;
use crate::storage::sanitize_filename;
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

/// Marks a resource path inside alt text and page bodies
pub const RESOURCE_MARKER: &str = "resources/";

/// Marks the resource namespace inside an image URL
const RESOURCE_URL_MARKER: &str = "/resources/";

/// An image referenced from a page body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// `src` exactly as written in the markup
    pub source_url: String,

    /// `alt` exactly as written in the markup
    pub alt_text: String,

    /// Address of the image within the asset's resource namespace
    pub resource_path: String,
}

fn src_then_alt() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)<img[^>]*src=["']([^"']+)["'][^>]*alt=["']([^"']+)["'][^>]*>"#)
            .expect("valid image pattern")
    })
}

fn alt_then_src() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)<img[^>]*alt=["']([^"']+)["'][^>]*src=["']([^"']+)["'][^>]*>"#)
            .expect("valid image pattern")
    })
}

/// Extracts image references from raw HTML, in document order
///
/// # Example
///
/// ```
/// use exchange_export::crawler::extract_image_references;
///
/// let html = r#"<p><img alt="resources/img/a.png" src="https://x/y/resources/img/a.png"></p>"#;
/// let images = extract_image_references(html);
/// assert_eq!(images[0].resource_path, "resources/img/a.png");
/// ```
pub fn extract_image_references(html: &str) -> Vec<ImageReference> {
    let mut found: Vec<(usize, String, String)> = Vec::new();

    for caps in src_then_alt().captures_iter(html) {
        found.push((caps.get_match().start(), caps[1].to_string(), caps[2].to_string()));
    }
    for caps in alt_then_src().captures_iter(html) {
        found.push((caps.get_match().start(), caps[2].to_string(), caps[1].to_string()));
    }

    // Stable sort keeps the src-first reading when both patterns claim a tag
    found.sort_by_key(|(start, _, _)| *start);
    found.dedup_by_key(|(start, _, _)| *start);

    found
        .into_iter()
        .map(|(_, source_url, alt_text)| ImageReference {
            resource_path: resolve_resource_path(&source_url, &alt_text),
            source_url,
            alt_text,
        })
        .collect()
}

/// Ordered rules deriving a resource path from an image tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceRule {
    /// Alt text already names a resource path
    AltPath,

    /// Source URL points into the resource namespace; decode its tail
    DecodedSource,

    /// Use the alt text unchanged
    AltFallback,
}

impl ResourceRule {
    /// Rules in evaluation order; the first that applies wins
    pub const ORDER: [ResourceRule; 3] = [Self::AltPath, Self::DecodedSource, Self::AltFallback];

    /// Applies this rule alone
    pub fn apply(&self, source_url: &str, alt_text: &str) -> Option<String> {
        match self {
            Self::AltPath => alt_text
                .contains(RESOURCE_MARKER)
                .then(|| alt_text.to_string()),
            Self::DecodedSource => source_url
                .rsplit_once(RESOURCE_URL_MARKER)
                .map(|(_, tail)| percent_decode(tail).into_owned()),
            Self::AltFallback => Some(alt_text.to_string()),
        }
    }
}

/// Derives the resource path of an image tag
///
/// | Rule | Condition | Result |
/// |------|-----------|--------|
/// | 1 | alt contains `resources/` | alt |
/// | 2 | src contains `/resources/` | src after the last marker, percent-decoded |
/// | 3 | otherwise | alt |
pub fn resolve_resource_path(source_url: &str, alt_text: &str) -> String {
    ResourceRule::ORDER
        .iter()
        .find_map(|rule| rule.apply(source_url, alt_text))
        .unwrap_or_else(|| alt_text.to_string())
}

/// Path used against the resource endpoint: every `resources/` removed
pub fn request_path(resource_path: &str) -> String {
    strip_resource_marker(resource_path)
}

/// Removes every `resources/` from page text
///
/// Applied to page bodies before they are rewritten or converted, and to
/// image URLs before they are matched against such a body.
pub fn strip_resource_marker(text: &str) -> String {
    text.replace(RESOURCE_MARKER, "")
}

/// Local file name for a downloaded image, relative to `images/`
///
/// With [`ImageNaming::ResourcePath`] each path segment is sanitized and
/// dot-only segments are dropped; if nothing is left the sequential
/// placeholder is used.
pub fn local_image_name(request_path: &str, naming: ImageNaming, index: usize) -> String {
    let placeholder = || format!("image_{}.png", index);

    match naming {
        ImageNaming::Sequential => placeholder(),
        ImageNaming::ResourcePath => {
            let segments: Vec<String> = request_path
                .split('/')
                .map(|segment| sanitize_filename(segment, true))
                .filter(|segment| segment.chars().any(|c| c != '.'))
                .collect();

            if segments.is_empty() {
                placeholder()
            } else {
                segments.join("/")
            }
        }
    }
}

/// Variant `n` of a local image name, used when the name is already taken
///
/// The counter goes before the extension of the last segment:
/// `img/a_b.png` becomes `img/a_b_1.png`.
pub fn numbered_name(name: &str, n: usize) -> String {
    let (dir, file) = match name.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, name),
    };

    let file = match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}_{}.{}", stem, n, ext),
        _ => format!("{}_{}", file, n),
    };

    match dir {
        Some(dir) => format!("{}/{}", dir, file),
        None => file,
    }
}

/// Replaces every literal occurrence of `source_url` with `local_path`
pub fn rewrite_reference(content: &str, source_url: &str, local_path: &str) -> String {
    content.replace(source_url, local_path)
}

fn percent_decode(text: &str) -> Cow<'_, str> {
    match urlencoding::decode(text) {
        Ok(decoded) => decoded,
        Err(_) => Cow::Owned(
            String::from_utf8_lossy(&urlencoding::decode_binary(text.as_bytes())).into_owned(),
        ),
    }
}
