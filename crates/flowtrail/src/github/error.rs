//! GitHub API error types.
//!
//! These never escape the client's public operations; they are logged and
//! converted into empty results or placeholder metadata.

use thiserror::Error;

use crate::http::HttpError;

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("unexpected HTTP status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("invalid JSON from {url}: {source}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid URL {url}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl GitHubError {
    /// Status code for status errors, used as a structured log field.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 403 and 429 are how GitHub signals an exhausted token.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self.status(), Some(403 | 429))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_statuses() {
        let forbidden = GitHubError::Status {
            status: 403,
            url: "u".to_string(),
        };
        let not_found = GitHubError::Status {
            status: 404,
            url: "u".to_string(),
        };
        let transport = GitHubError::Http(HttpError::Timeout("u".to_string()));

        assert!(forbidden.is_rate_limited());
        assert!(!not_found.is_rate_limited());
        assert!(!transport.is_rate_limited());
        assert_eq!(transport.status(), None);
    }
}
