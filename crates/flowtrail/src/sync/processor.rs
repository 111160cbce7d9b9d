//! Walks one repository's watched-path history into the cache and tracker.

use std::collections::HashSet;
use std::sync::Arc;

use super::progress::{CrawlProgress, ProgressCallback, emit};
use super::types::{CrawlError, DEFAULT_WATCHED_PATH, RepoOutcome, RepositoryStats};
use crate::cache::ContentCache;
use crate::github::GitHubClient;
use crate::model::{RepositoryRef, TrackerRecord};
use crate::tracker::ProvenanceTracker;

/// Processes one repository at a time. Cheap to share across tasks.
#[derive(Clone)]
pub struct RepositoryProcessor {
    client: GitHubClient,
    cache: ContentCache,
    tracker: Arc<ProvenanceTracker>,
    watched_path: String,
}

impl RepositoryProcessor {
    pub fn new(
        client: GitHubClient,
        cache: ContentCache,
        tracker: Arc<ProvenanceTracker>,
    ) -> Self {
        Self {
            client,
            cache,
            tracker,
            watched_path: DEFAULT_WATCHED_PATH.to_string(),
        }
    }

    #[must_use]
    pub fn with_watched_path(mut self, path: impl Into<String>) -> Self {
        self.watched_path = path.into();
        self
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    pub fn tracker(&self) -> &ProvenanceTracker {
        &self.tracker
    }

    /// Process one input line.
    ///
    /// Terminal events (finished, skipped, failed) are left to the caller so
    /// that panicked tasks can be reported through the same path.
    pub async fn process(
        &self,
        input: &str,
        on_progress: Option<&ProgressCallback>,
    ) -> RepoOutcome {
        let repo: RepositoryRef = match input.parse() {
            Ok(repo) => repo,
            Err(e) => {
                tracing::debug!(input, error = %e, "Skipping repository");
                return RepoOutcome::Skipped {
                    reason: e.to_string(),
                };
            }
        };

        match self.process_repository(&repo, on_progress).await {
            Ok(stats) => RepoOutcome::Completed(stats),
            Err(e) => {
                tracing::debug!(repo = %repo, error = %e, "Repository walk aborted");
                RepoOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Walk every listed revision of `repo`.
    ///
    /// A revision with any cached entry is served from the cache without
    /// touching the network. Local I/O errors abort the walk.
    pub async fn process_repository(
        &self,
        repo: &RepositoryRef,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<RepositoryStats, CrawlError> {
        let repository = repo.full_name();
        emit(
            on_progress,
            CrawlProgress::RepositoryStarted {
                repository: repository.clone(),
            },
        );

        let dir = self.cache.ensure_repository_dir(repo).await?;
        tracing::debug!(repo = %repo, dir = %dir.display(), "Cache directory ready");

        let revisions = self.client.list_revisions(repo, &self.watched_path).await;
        let mut stats = RepositoryStats {
            revisions: revisions.len(),
            ..RepositoryStats::default()
        };
        emit(
            on_progress,
            CrawlProgress::RevisionsListed {
                repository: repository.clone(),
                count: revisions.len(),
            },
        );

        let mut seen: HashSet<(String, String)> = HashSet::new();

        for revision in &revisions {
            let sha = revision.sha.as_str();

            let cached = self.cache.entries_for_revision(repo, sha).await?;
            if !cached.is_empty() {
                tracing::debug!(repo = %repo, commit = sha, files = cached.len(), "Revision served from cache");
                stats.cache_hits += 1;
                for entry in cached {
                    emit(
                        on_progress,
                        CrawlProgress::CacheHit {
                            repository: repository.clone(),
                            revision: sha.to_string(),
                            file_name: entry.file_name,
                            cache_path: entry.path,
                            content: entry.content,
                        },
                    );
                }
                continue;
            }

            let metadata = self.client.revision_metadata(repo, sha).await;
            let snapshots = self
                .client
                .file_snapshots(repo, &self.watched_path, sha)
                .await;

            for snapshot in snapshots {
                if !seen.insert((snapshot.path.clone(), snapshot.revision.clone())) {
                    tracing::debug!(repo = %repo, commit = sha, file = %snapshot.path, "Duplicate snapshot ignored");
                    continue;
                }

                let cache_path = self
                    .cache
                    .write(repo, &snapshot.revision, &snapshot.name, &snapshot.content)
                    .await?;
                stats.files_fetched += 1;

                let record = TrackerRecord::new(&metadata, &snapshot, &cache_path);
                self.tracker.append(&record).await?;
                stats.records_appended += 1;

                emit(
                    on_progress,
                    CrawlProgress::Fetched {
                        repository: repository.clone(),
                        revision: snapshot.revision,
                        file_name: snapshot.name,
                        url: snapshot.url,
                        cache_path,
                        content: snapshot.content,
                    },
                );
            }
        }

        tracing::info!(
            repo = %repo,
            revisions = stats.revisions,
            cache_hits = stats.cache_hits,
            fetched = stats.files_fetched,
            "Repository processed"
        );
        Ok(stats)
    }
}
