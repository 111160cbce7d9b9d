//! Crawl orchestration: per-repository processing and the batch scheduler.
//!
//! # Module Structure
//!
//! - [`types`] - Core types: `RepositoryStats`, `RepoOutcome`, `BatchResult`, constants
//! - [`progress`] - Progress reporting: `CrawlProgress`, `ProgressCallback`, `emit()`
//! - [`processor`] - `RepositoryProcessor`, the cache-aware walk of one repository
//! - [`scheduler`] - `run_batch()`, the bounded fan-out over many repositories
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use flowtrail::cache::ContentCache;
//! use flowtrail::credentials::CredentialPool;
//! use flowtrail::github::GitHubClient;
//! use flowtrail::sync::{DEFAULT_WORKERS, RepositoryProcessor, run_batch};
//! use flowtrail::tracker::ProvenanceTracker;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GitHubClient::new(CredentialPool::from_file("tokens.txt")?, Duration::from_secs(30))?;
//! let tracker = Arc::new(ProvenanceTracker::open("cachetracker.json").await?);
//! let processor = Arc::new(RepositoryProcessor::new(client, ContentCache::default(), tracker));
//!
//! let result = run_batch(processor, vec!["acme/widgets".to_string()], DEFAULT_WORKERS, None).await;
//! println!("{} repositories failed", result.failed());
//! # Ok(())
//! # }
//! ```

mod processor;
mod progress;
mod scheduler;
mod types;

pub use processor::RepositoryProcessor;
pub use progress::{CrawlProgress, ProgressCallback, emit};
pub use scheduler::run_batch;
pub use types::{
    BatchResult, CrawlError, DEFAULT_WATCHED_PATH, DEFAULT_WORKERS, RepoOutcome, RepositoryResult,
    RepositoryStats,
};
