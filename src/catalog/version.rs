//! Version parsing and comparison
//!
//! Versions are dotted token sequences. When every token parses as an
//! integer the version compares component by component; otherwise the whole
//! version degrades to its raw string and compares as text.
//!
//! Integer components have no width limit.

use std::cmp::Ordering;
use std::fmt;

/// One integer component of a numeric version
///
/// Held as its decimal digits without leading zeros, so any length compares
/// by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Component {
    negative: bool,
    digits: String,
}

impl Component {
    /// Parses an optionally signed decimal integer, ignoring surrounding whitespace
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (negative, unsigned) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };

        if unsigned.is_empty() || !unsigned.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let trimmed = unsigned.trim_start_matches('0');
        let digits = if trimmed.is_empty() { "0" } else { trimmed };

        Some(Self {
            negative: negative && digits != "0",
            digits: digits.to_string(),
        })
    }

    fn cmp_magnitude(&self, other: &Self) -> Ordering {
        self.digits
            .len()
            .cmp(&other.digits.len())
            .then_with(|| self.digits.cmp(&other.digits))
    }
}

impl Ord for Component {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, false) => self.cmp_magnitude(other),
            (true, true) => other.cmp_magnitude(self),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Component {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        f.write_str(&self.digits)
    }
}

/// A parsed catalog version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Version {
    /// Every dot-separated component is an integer (e.g. `1.10.0`)
    Numeric { components: Vec<Component>, raw: String },

    /// At least one component is not an integer; compared as a single string
    Opaque(String),
}

impl Version {
    /// Parses a version string
    ///
    /// Parsing never fails: anything that is not a dotted integer sequence
    /// becomes [`Version::Opaque`].
    ///
    /// # Examples
    ///
    /// ```
    /// use exchange_export::Version;
    ///
    /// assert!(matches!(Version::parse("1.2.3"), Version::Numeric { .. }));
    /// assert!(matches!(Version::parse("1.0-SNAPSHOT"), Version::Opaque(_)));
    /// ```
    pub fn parse(raw: &str) -> Self {
        let components: Option<Vec<Component>> = raw.split('.').map(Component::parse).collect();

        match components {
            Some(components) => Self::Numeric {
                components,
                raw: raw.to_string(),
            },
            None => Self::Opaque(raw.to_string()),
        }
    }

    /// The original version string
    pub fn as_str(&self) -> &str {
        match self {
            Self::Numeric { raw, .. } => raw,
            Self::Opaque(raw) => raw,
        }
    }

    /// Returns true if this version strictly compares greater than `other`
    pub fn is_newer_than(&self, other: &Version) -> bool {
        self.partial_cmp(other) == Some(Ordering::Greater)
    }
}

// Not `Ord`: mixing numeric and opaque versions is not transitive
// ("2" < "10" numerically, "10" < "1x" and "1x" < "2" as text).
impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let ordering = match (self, other) {
            (Self::Numeric { components: a, .. }, Self::Numeric { components: b, .. }) => a.cmp(b),
            _ => self.as_str().cmp(other.as_str()),
        };
        Some(ordering)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
