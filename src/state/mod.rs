//! State module for tracking crawl progress
//!
//! This module provides the per-page state machine used while crawling an
//! asset's documentation portal.

mod page_state;

pub use page_state::PageState;
