//! Wire types for the subset of the GitHub REST API the crawler reads.

use serde::Deserialize;

/// Media type requested on every call.
pub const ACCEPT_HEADER: &str = "application/vnd.github.v3+json";

/// User agent sent on every call (GitHub rejects requests without one).
pub const USER_AGENT: &str = concat!("flowtrail/", env!("CARGO_PKG_VERSION"));

/// Default public API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Page size for the commit listing; only the first page is read.
pub const COMMITS_PER_PAGE: usize = 100;

/// Entry of `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitSummary {
    pub sha: String,
}

/// Body of `GET /repos/{owner}/{repo}/commits/{sha}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    pub commit: CommitInfo,
    pub html_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitInfo {
    pub author: CommitAuthor,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
    pub date: String,
}

/// One item of `GET /repos/{owner}/{repo}/contents/{path}`.
///
/// Directory listings omit `content` and `encoding`; files carry both.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentItem {
    #[serde(rename = "type")]
    pub item_type: String,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl ContentItem {
    pub fn is_file(&self) -> bool {
        self.item_type == "file"
    }
}

/// The contents endpoint answers with a single object for a file and an
/// array for a directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ContentResponse {
    Directory(Vec<ContentItem>),
    File(ContentItem),
}
