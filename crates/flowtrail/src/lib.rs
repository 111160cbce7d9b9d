//! Flowtrail - a concurrent, cache-aware crawler for CI workflow history.
//!
//! For every repository in a batch, flowtrail lists the revisions that
//! touched the watched path (`.github/workflows` by default), fetches each
//! file as of each revision, stores it in an on-disk content cache and
//! appends a provenance record to a shared newline-delimited JSON tracker.
//! Revisions already present in the cache are served locally without any
//! network traffic.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use flowtrail::{ContentCache, CredentialPool, GitHubClient, ProvenanceTracker};
//! use flowtrail::http::DEFAULT_REQUEST_TIMEOUT;
//! use flowtrail::sync::{CrawlProgress, ProgressCallback, RepositoryProcessor, run_batch};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GitHubClient::new(CredentialPool::new(["ghp_example"]), DEFAULT_REQUEST_TIMEOUT)?;
//! let tracker = Arc::new(ProvenanceTracker::open("cachetracker.json").await?);
//! let processor = Arc::new(RepositoryProcessor::new(client, ContentCache::new("cache"), tracker));
//!
//! let on_progress: ProgressCallback = Box::new(|event| {
//!     if let CrawlProgress::Fetched { file_name, content, .. } = event {
//!         println!("--- {file_name} ---\n{content}");
//!     }
//! });
//!
//! run_batch(processor, vec!["acme/widgets".to_string()], 25, Some(on_progress)).await;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod credentials;
pub mod github;
pub mod http;
pub mod model;
pub mod sync;
pub mod tracker;

pub use cache::{CacheError, ContentCache};
pub use credentials::{Credential, CredentialPool};
pub use github::{GitHubClient, GitHubError};
pub use model::{FileSnapshot, RepositoryRef, Revision, TrackerRecord};
pub use sync::{BatchResult, CrawlError, RepoOutcome};
pub use tracker::{ProvenanceTracker, TrackerError};
