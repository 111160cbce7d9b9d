//! Shared crawl types and constants.

use thiserror::Error;

use crate::cache::CacheError;
use crate::tracker::TrackerError;

/// Default number of repositories processed concurrently.
pub const DEFAULT_WORKERS: usize = 25;

/// Default repository path whose history is crawled.
pub const DEFAULT_WATCHED_PATH: &str = ".github/workflows";

/// Error that aborts one repository's walk.
///
/// Remote failures never surface here; the client absorbs them.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

/// Counters for one repository walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepositoryStats {
    /// Revisions returned by the listing.
    pub revisions: usize,
    /// Revisions served entirely from the cache.
    pub cache_hits: usize,
    /// Files fetched remotely and written to the cache.
    pub files_fetched: usize,
    /// Lines appended to the tracker.
    pub records_appended: usize,
}

impl RepositoryStats {
    pub fn merge(&mut self, other: &RepositoryStats) {
        self.revisions += other.revisions;
        self.cache_hits += other.cache_hits;
        self.files_fetched += other.files_fetched;
        self.records_appended += other.records_appended;
    }
}

/// How one repository task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoOutcome {
    Completed(RepositoryStats),
    /// The input was not a usable `owner/name` reference.
    Skipped { reason: String },
    /// Local I/O failed, or the task panicked.
    Failed { error: String },
}

impl RepoOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Outcome of one repository, keyed by the input line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryResult {
    pub input: String,
    pub outcome: RepoOutcome,
}

/// Result of a whole batch, in completion order.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub repositories: Vec<RepositoryResult>,
}

impl BatchResult {
    pub fn completed(&self) -> usize {
        self.count(|o| matches!(o, RepoOutcome::Completed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, RepoOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(RepoOutcome::is_failed)
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// Stats summed over completed repositories.
    pub fn totals(&self) -> RepositoryStats {
        let mut totals = RepositoryStats::default();
        for result in &self.repositories {
            if let RepoOutcome::Completed(stats) = &result.outcome {
                totals.merge(stats);
            }
        }
        totals
    }

    /// Look up the outcome for an input line.
    pub fn outcome(&self, input: &str) -> Option<&RepoOutcome> {
        self.repositories
            .iter()
            .find(|r| r.input == input)
            .map(|r| &r.outcome)
    }

    fn count(&self, pred: impl Fn(&RepoOutcome) -> bool) -> usize {
        self.repositories.iter().filter(|r| pred(&r.outcome)).count()
    }
}
