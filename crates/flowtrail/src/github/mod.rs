//! GitHub API access for revision history and file contents.
//!
//! # Module Structure
//!
//! - [`error`] - Error type for failed API calls (never surfaced to callers)
//! - [`types`] - Wire types and request constants
//! - [`client`] - The [`GitHubClient`] used by the repository processor

mod client;
mod error;
mod types;

pub use client::GitHubClient;
pub use error::GitHubError;
pub use types::{
    ACCEPT_HEADER, COMMITS_PER_PAGE, CommitDetail, ContentItem, ContentResponse, DEFAULT_API_URL,
    USER_AGENT,
};

#[cfg(test)]
pub(crate) use client::test_support;
