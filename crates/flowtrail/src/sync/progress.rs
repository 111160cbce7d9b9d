//! Progress reporting types for crawl operations.
//!
//! The library never prints. Everything a user might want to see, including
//! the content of each workflow file, reaches the caller as a
//! [`CrawlProgress`] event.

use std::path::PathBuf;

use super::types::RepositoryStats;

/// Progress events emitted during a crawl.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum CrawlProgress {
    /// A batch is about to start.
    BatchStarted {
        /// Number of input lines.
        repositories: usize,
        /// Effective concurrency.
        workers: usize,
    },

    /// A repository task acquired a worker slot.
    RepositoryStarted { repository: String },

    /// Revision listing finished.
    RevisionsListed { repository: String, count: usize },

    /// A file was served from the cache.
    CacheHit {
        repository: String,
        revision: String,
        file_name: String,
        cache_path: PathBuf,
        content: String,
    },

    /// A file was fetched, cached and recorded in the tracker.
    Fetched {
        repository: String,
        revision: String,
        file_name: String,
        /// Browser URL of the file at this revision.
        url: String,
        cache_path: PathBuf,
        content: String,
    },

    RepositoryFinished {
        repository: String,
        stats: RepositoryStats,
    },

    /// The input line was not a usable repository reference.
    RepositorySkipped { input: String, reason: String },

    RepositoryFailed { repository: String, error: String },

    /// Every task has finished.
    BatchComplete {
        completed: usize,
        skipped: usize,
        failed: usize,
    },
}

/// Callback type for progress reporting.
pub type ProgressCallback = Box<dyn Fn(CrawlProgress) + Send + Sync>;

/// Helper to emit progress events.
///
/// # Example
///
/// ```
/// use flowtrail::sync::{emit, CrawlProgress, ProgressCallback};
///
/// fn report(on_progress: Option<&ProgressCallback>) {
///     emit(on_progress, CrawlProgress::RevisionsListed {
///         repository: "acme/widgets".to_string(),
///         count: 3,
///     });
/// }
/// ```
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: CrawlProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}
