//! GitHub REST client for revision listings, commit metadata and file content.
//!
//! Every public operation is infallible from the caller's point of view:
//! remote failures are logged and degrade to an empty result or placeholder
//! metadata, so one bad response never aborts a repository walk.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::de::DeserializeOwned;
use url::Url;

use super::error::GitHubError;
use super::types::{
    ACCEPT_HEADER, COMMITS_PER_PAGE, CommitDetail, CommitSummary, ContentItem, ContentResponse,
    DEFAULT_API_URL, USER_AGENT,
};
use crate::credentials::CredentialPool;
use crate::http::{HttpRequest, HttpTransport, ReqwestTransport};
use crate::model::{FileSnapshot, RepositoryRef, Revision, RevisionSummary};

/// Client for the remote repository API.
#[derive(Clone)]
pub struct GitHubClient {
    transport: Arc<dyn HttpTransport>,
    credentials: CredentialPool,
    api_url: Url,
}

impl GitHubClient {
    /// Create a client for the public API with a reqwest transport whose
    /// requests time out after `timeout`.
    pub fn new(credentials: CredentialPool, timeout: Duration) -> Result<Self, GitHubError> {
        let transport = ReqwestTransport::with_timeout(timeout)?;
        Self::with_transport(DEFAULT_API_URL, Arc::new(transport), credentials)
    }

    /// Create a client against an arbitrary API base URL and transport.
    pub fn with_transport(
        api_url: &str,
        transport: Arc<dyn HttpTransport>,
        credentials: CredentialPool,
    ) -> Result<Self, GitHubError> {
        let api_url = parse_url(api_url)?;
        if api_url.cannot_be_a_base() {
            return Err(GitHubError::Url {
                url: api_url.to_string(),
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            });
        }

        Ok(Self {
            transport,
            credentials,
            api_url,
        })
    }

    /// List up to [`COMMITS_PER_PAGE`] most recent revisions touching `path`.
    ///
    /// Only the first page is read.
    pub async fn list_revisions(&self, repo: &RepositoryRef, path: &str) -> Vec<RevisionSummary> {
        let mut url = self.endpoint(repo, &["commits"]);
        url.query_pairs_mut()
            .append_pair("path", path)
            .append_pair("per_page", &COMMITS_PER_PAGE.to_string());

        let entries: Vec<serde_json::Value> = match self.get_json(url).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    repo = %repo,
                    path,
                    status = ?e.status(),
                    rate_limited = e.is_rate_limited(),
                    error = %e,
                    "Failed to list revisions"
                );
                return Vec::new();
            }
        };

        entries
            .into_iter()
            .filter_map(|raw| {
                let summary: CommitSummary = serde_json::from_value(raw.clone()).ok()?;
                Some(RevisionSummary {
                    sha: summary.sha,
                    raw,
                })
            })
            .collect()
    }

    /// Fetch authorship metadata for one revision.
    ///
    /// Returns [`Revision::unknown`] if the metadata cannot be fetched.
    pub async fn revision_metadata(&self, repo: &RepositoryRef, sha: &str) -> Revision {
        let url = self.endpoint(repo, &["commits", sha]);

        match self.get_json::<CommitDetail>(url).await {
            Ok(detail) => Revision {
                sha: sha.to_string(),
                author_name: detail.commit.author.name,
                author_email: detail.commit.author.email,
                timestamp: detail.commit.author.date,
                patch_url: format!("{}.patch", detail.html_url),
            },
            Err(e) => {
                tracing::warn!(repo = %repo, commit = sha, error = %e, "Failed to fetch revision metadata");
                Revision::unknown(sha)
            }
        }
    }

    /// Fetch the decoded files under `path` as of revision `sha`.
    ///
    /// A directory listing is expanded with one request per file entry; an
    /// entry whose request or decoding fails is dropped on its own.
    pub async fn file_snapshots(
        &self,
        repo: &RepositoryRef,
        path: &str,
        sha: &str,
    ) -> Vec<FileSnapshot> {
        let mut url = self.endpoint(repo, &["contents"]);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
        }
        url.query_pairs_mut().append_pair("ref", sha);

        let response = match self.get_json::<ContentResponse>(url).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(repo = %repo, commit = sha, path, error = %e, "Failed to fetch contents");
                return Vec::new();
            }
        };

        match response {
            ContentResponse::File(item) => decode_item(repo, sha, item).into_iter().collect(),
            ContentResponse::Directory(items) => {
                let mut snapshots = Vec::with_capacity(items.len());
                for item in items.into_iter().filter(ContentItem::is_file) {
                    if let Some(snapshot) = self.fetch_listed_file(repo, sha, &item).await {
                        snapshots.push(snapshot);
                    }
                }
                snapshots
            }
        }
    }

    async fn fetch_listed_file(
        &self,
        repo: &RepositoryRef,
        sha: &str,
        item: &ContentItem,
    ) -> Option<FileSnapshot> {
        let Some(item_url) = item.url.as_deref() else {
            tracing::debug!(repo = %repo, commit = sha, file = %item.path, "Listed file has no API URL");
            return None;
        };

        let result = match with_ref(item_url, sha) {
            Ok(url) => self.get_json::<ContentItem>(url).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(file) => decode_item(repo, sha, file),
            Err(e) => {
                tracing::warn!(repo = %repo, commit = sha, file = %item.path, error = %e, "Failed to fetch listed file");
                None
            }
        }
    }

    fn endpoint(&self, repo: &RepositoryRef, tail: &[&str]) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["repos", repo.owner.as_str(), repo.name.as_str()])
                .extend(tail);
        }
        url
    }

    fn request(&self, url: &Url) -> HttpRequest {
        let request = HttpRequest::get(url.as_str())
            .header("Accept", ACCEPT_HEADER)
            .header("User-Agent", USER_AGENT);

        match self.credentials.select() {
            Some(credential) => request.header("Authorization", credential.authorization()),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, GitHubError> {
        let response = self.transport.send(self.request(&url)).await?;

        if !response.is_success() {
            tracing::debug!(
                url = %url,
                status = response.status,
                rate_limit_remaining = response.header("x-ratelimit-remaining").unwrap_or("-"),
                "Request rejected"
            );
            return Err(GitHubError::Status {
                status: response.status,
                url: url.to_string(),
            });
        }

        serde_json::from_slice(&response.body).map_err(|source| GitHubError::Json {
            url: url.to_string(),
            source,
        })
    }
}

fn parse_url(url: &str) -> Result<Url, GitHubError> {
    Url::parse(url).map_err(|source| GitHubError::Url {
        url: url.to_string(),
        source,
    })
}

/// Point `url` at revision `sha`, replacing any `ref` it already carries.
fn with_ref(url: &str, sha: &str) -> Result<Url, GitHubError> {
    let mut url = parse_url(url)?;
    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "ref")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.set_query(None);
    {
        let mut query = url.query_pairs_mut();
        for (k, v) in &retained {
            query.append_pair(k, v);
        }
        query.append_pair("ref", sha);
    }
    Ok(url)
}

/// Decode a base64 file payload into a snapshot.
fn decode_item(repo: &RepositoryRef, sha: &str, item: ContentItem) -> Option<FileSnapshot> {
    if item.encoding.as_deref() != Some("base64") {
        tracing::debug!(repo = %repo, commit = sha, file = %item.path, encoding = ?item.encoding, "Skipping non-base64 payload");
        return None;
    }

    // GitHub wraps base64 payloads at 60 columns.
    let compact: String = item
        .content
        .as_deref()?
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let content = match STANDARD.decode(compact) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(repo = %repo, commit = sha, file = %item.path, error = %e, "Skipping non-UTF-8 file");
                return None;
            }
        },
        Err(e) => {
            tracing::debug!(repo = %repo, commit = sha, file = %item.path, error = %e, "Skipping undecodable payload");
            return None;
        }
    };

    Some(FileSnapshot {
        repository: repo.clone(),
        revision: sha.to_string(),
        path: item.path,
        name: item.name,
        content,
        url: item.html_url.unwrap_or_default(),
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Canned API responses shared by client, processor and scheduler tests.

    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde_json::{Value, json};

    use crate::http::MockTransport;

    pub const API: &str = "https://api.github.test";
    pub const WORKFLOWS: &str = ".github/workflows";

    pub fn commits_url(owner: &str, name: &str) -> String {
        format!("{API}/repos/{owner}/{name}/commits?path=.github%2Fworkflows&per_page=100")
    }

    pub fn commit_url(owner: &str, name: &str, sha: &str) -> String {
        format!("{API}/repos/{owner}/{name}/commits/{sha}")
    }

    pub fn contents_url(owner: &str, name: &str, sha: &str) -> String {
        format!("{API}/repos/{owner}/{name}/contents/.github/workflows?ref={sha}")
    }

    pub fn file_api_url(owner: &str, name: &str, file: &str, sha: &str) -> String {
        format!("{API}/repos/{owner}/{name}/contents/.github/workflows/{file}?ref={sha}")
    }

    pub fn file_item(owner: &str, name: &str, sha: &str, file: &str, body: &str) -> Value {
        json!({
            "type": "file",
            "name": file,
            "path": format!("{WORKFLOWS}/{file}"),
            "encoding": "base64",
            "content": STANDARD.encode(body),
            "url": format!("{API}/repos/{owner}/{name}/contents/{WORKFLOWS}/{file}?ref=main"),
            "html_url": format!("https://github.com/{owner}/{name}/blob/{sha}/{WORKFLOWS}/{file}"),
        })
    }

    pub fn listing_item(owner: &str, name: &str, file: &str) -> Value {
        json!({
            "type": "file",
            "name": file,
            "path": format!("{WORKFLOWS}/{file}"),
            "url": format!("{API}/repos/{owner}/{name}/contents/{WORKFLOWS}/{file}?ref=main"),
        })
    }

    pub fn commit_detail(owner: &str, name: &str, sha: &str) -> Value {
        json!({
            "sha": sha,
            "html_url": format!("https://github.com/{owner}/{name}/commit/{sha}"),
            "commit": {"author": {
                "name": "Ada Lovelace",
                "email": "ada@example.com",
                "date": "2024-05-01T10:00:00Z"
            }}
        })
    }

    /// Register a full, single-file history: one revision containing `files`.
    pub fn mock_single_revision(
        transport: &MockTransport,
        owner: &str,
        name: &str,
        sha: &str,
        files: &[(&str, &str)],
    ) {
        transport.push_json(commits_url(owner, name), json!([{"sha": sha}]));
        transport.push_json(commit_url(owner, name, sha), commit_detail(owner, name, sha));

        if let [(file, body)] = files {
            transport.push_json(
                contents_url(owner, name, sha),
                file_item(owner, name, sha, file, body),
            );
        } else {
            let listing: Vec<Value> = files
                .iter()
                .map(|(file, _)| listing_item(owner, name, file))
                .collect();
            transport.push_json(contents_url(owner, name, sha), Value::Array(listing));
            for (file, body) in files {
                transport.push_json(
                    file_api_url(owner, name, file, sha),
                    file_item(owner, name, sha, file, body),
                );
            }
        }
    }
}
