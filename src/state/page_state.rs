/// Page state definitions for tracking documentation crawl progress
///
/// This module defines all states a portal page can be in while one asset's
/// documentation tree is crawled.
use crate::ExportError;
use std::fmt;

/// Represents the current state of a portal page in the crawl process
///
/// ```text
/// Listed ─┬─> ContentFetched ──> Rewritten ──> Converted
///         ├─> EmptyBody
///         └─> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    /// Page appeared in the portal page list
    Listed,

    /// Page content was fetched and saved
    ContentFetched,

    /// Page content was fetched but the body was empty
    EmptyBody,

    /// Image references were resolved and rewritten to local paths
    Rewritten,

    /// Rewritten HTML was converted to Markdown and saved
    Converted,

    /// Page has no path or its content could not be fetched
    Failed,
}

impl PageState {
    /// Returns true if the transition `self -> next` is allowed
    ///
    /// No state is ever revisited.
    pub fn can_transition_to(&self, next: PageState) -> bool {
        matches!(
            (self, next),
            (Self::Listed, Self::ContentFetched)
                | (Self::Listed, Self::EmptyBody)
                | (Self::Listed, Self::Failed)
                | (Self::ContentFetched, Self::Rewritten)
                | (Self::Rewritten, Self::Converted)
        )
    }

    /// Moves to `next`, rejecting transitions the state machine does not allow
    pub fn advance(&mut self, next: PageState) -> Result<(), ExportError> {
        if !self.can_transition_to(next) {
            return Err(ExportError::InvalidTransition { from: *self, to: next });
        }
        *self = next;
        Ok(())
    }

    /// Returns true if the page content reached the output directory
    pub fn is_saved(&self) -> bool {
        !matches!(self, Self::Listed | Self::Failed)
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(self, Self::EmptyBody | Self::Failed)
    }

    /// Converts the page state to its string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Listed => "listed",
            Self::ContentFetched => "content_fetched",
            Self::EmptyBody => "empty_body",
            Self::Rewritten => "rewritten",
            Self::Converted => "converted",
            Self::Failed => "failed",
        }
    }

    /// Returns all possible page states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Listed,
            Self::ContentFetched,
            Self::EmptyBody,
            Self::Rewritten,
            Self::Converted,
            Self::Failed,
        ]
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
