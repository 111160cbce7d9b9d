use flowtrail::sync::CrawlProgress;

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: CrawlProgress) {
        match event {
            CrawlProgress::BatchStarted {
                repositories,
                workers,
            } => {
                tracing::info!(repositories, workers, "Crawling repositories");
            }

            CrawlProgress::RepositoryStarted { repository } => {
                tracing::debug!(repo = %repository, "Processing repository");
            }

            CrawlProgress::RevisionsListed { repository, count } => {
                tracing::info!(repo = %repository, count, "Listed revisions");
            }

            CrawlProgress::CacheHit {
                repository,
                revision,
                file_name,
                cache_path,
                content,
            } => {
                tracing::info!(
                    repo = %repository,
                    commit = %revision,
                    file = %file_name,
                    cache_path = %cache_path.display(),
                    "Cached"
                );
                tracing::debug!(repo = %repository, commit = %revision, file = %file_name, content = %content, "Content");
            }

            CrawlProgress::Fetched {
                repository,
                revision,
                file_name,
                url,
                cache_path,
                content,
            } => {
                tracing::info!(
                    repo = %repository,
                    commit = %revision,
                    file = %file_name,
                    url = %url,
                    cache_path = %cache_path.display(),
                    "Fetched"
                );
                tracing::debug!(repo = %repository, commit = %revision, file = %file_name, content = %content, "Content");
            }

            CrawlProgress::RepositoryFinished { repository, stats } => {
                tracing::info!(
                    repo = %repository,
                    revisions = stats.revisions,
                    cache_hits = stats.cache_hits,
                    fetched = stats.files_fetched,
                    "Repository complete"
                );
            }

            CrawlProgress::RepositorySkipped { input, reason } => {
                tracing::warn!(input = %input, reason = %reason, "Skipped");
            }

            CrawlProgress::RepositoryFailed { repository, error } => {
                tracing::error!(repo = %repository, error = %error, "Repository failed");
            }

            CrawlProgress::BatchComplete {
                completed,
                skipped,
                failed,
            } => {
                tracing::info!(completed, skipped, failed, "Crawl complete");
            }

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}
