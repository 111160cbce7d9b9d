use std::sync::Mutex;

use console::{Term, style};
use flowtrail::sync::CrawlProgress;

/// Interactive reporter that prints every file as a block on stdout.
///
/// Events arrive from many repository tasks at once; the terminal lock keeps
/// each block contiguous.
pub struct InteractiveReporter {
    term: Mutex<Term>,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self {
            term: Mutex::new(Term::stdout()),
        }
    }

    pub fn handle(&self, event: CrawlProgress) {
        let Some(block) = render(&event) else {
            return;
        };

        let term = self.term.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = term.write_line(&block) {
            tracing::debug!(error = %e, "Failed to write to terminal");
        }
    }
}

impl Default for InteractiveReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Render an event as terminal output, or `None` for events that stay quiet.
fn render(event: &CrawlProgress) -> Option<String> {
    let block = match event {
        CrawlProgress::BatchStarted {
            repositories,
            workers,
        } => format!(
            "{} Crawling {} repositories with {} workers",
            style("→").cyan(),
            repositories,
            workers
        ),

        CrawlProgress::RepositoryStarted { repository } => {
            style(format!("=== {repository} ===")).cyan().bold().to_string()
        }

        CrawlProgress::CacheHit {
            repository,
            revision,
            file_name,
            cache_path,
            content,
        } => format!(
            "{}\nCommit: {}\nCached from: {}\n{}",
            style(format!("--- {repository}: {file_name} ---")).bold(),
            revision,
            cache_path.display(),
            content
        ),

        CrawlProgress::Fetched {
            repository,
            revision,
            file_name,
            url,
            content,
            ..
        } => format!(
            "{}\nCommit: {}\nURL: {}\n{}",
            style(format!("--- {repository}: {file_name} ---")).bold(),
            revision,
            url,
            content
        ),

        CrawlProgress::RepositorySkipped { input, reason } => {
            format!("{} Skipped {input}: {reason}", style("!").yellow())
        }

        CrawlProgress::RepositoryFailed { repository, error } => {
            format!("{} {repository}: {error}", style("✗").red())
        }

        CrawlProgress::BatchComplete {
            completed,
            skipped,
            failed,
        } => {
            let mark = if *failed > 0 {
                style("✗").red()
            } else {
                style("✓").green()
            };
            format!("{mark} {completed} completed, {skipped} skipped, {failed} failed")
        }

        _ => return None,
    };

    Some(block)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use flowtrail::sync::RepositoryStats;

    use super::*;

    fn plain(event: &CrawlProgress) -> Option<String> {
        console::set_colors_enabled(false);
        render(event)
    }

    #[test]
    fn fetched_block_shows_commit_url_and_content() {
        let block = plain(&CrawlProgress::Fetched {
            repository: "acme/widgets".to_string(),
            revision: "abc123".to_string(),
            file_name: "ci.yml".to_string(),
            url: "https://github.com/acme/widgets/blob/abc123/.github/workflows/ci.yml".to_string(),
            cache_path: PathBuf::from("cache/acme/widgets/abc123_ci.yml"),
            content: "name: CI".to_string(),
        })
        .unwrap();

        assert_eq!(
            block,
            "--- acme/widgets: ci.yml ---\nCommit: abc123\n\
             URL: https://github.com/acme/widgets/blob/abc123/.github/workflows/ci.yml\n\
             name: CI"
        );
    }

    #[test]
    fn cache_hit_block_shows_cache_path() {
        let block = plain(&CrawlProgress::CacheHit {
            repository: "acme/widgets".to_string(),
            revision: "abc123".to_string(),
            file_name: "ci.yml".to_string(),
            cache_path: PathBuf::from("cache/acme/widgets/abc123_ci.yml"),
            content: "name: CI".to_string(),
        })
        .unwrap();

        assert!(block.starts_with("--- acme/widgets: ci.yml ---\nCommit: abc123\n"));
        assert!(block.contains("Cached from: cache/acme/widgets/abc123_ci.yml"));
        assert!(block.ends_with("name: CI"));
    }

    #[test]
    fn repository_start_prints_header() {
        let header = plain(&CrawlProgress::RepositoryStarted {
            repository: "acme/widgets".to_string(),
        });
        assert_eq!(header.as_deref(), Some("=== acme/widgets ==="));
    }

    #[test]
    fn bookkeeping_events_are_quiet() {
        assert!(
            plain(&CrawlProgress::RevisionsListed {
                repository: "acme/widgets".to_string(),
                count: 3,
            })
            .is_none()
        );
        assert!(
            plain(&CrawlProgress::RepositoryFinished {
                repository: "acme/widgets".to_string(),
                stats: RepositoryStats::default(),
            })
            .is_none()
        );
    }

    #[test]
    fn batch_summary_counts_outcomes() {
        let line = plain(&CrawlProgress::BatchComplete {
            completed: 3,
            skipped: 1,
            failed: 2,
        })
        .unwrap();
        assert!(line.ends_with("3 completed, 1 skipped, 2 failed"));
    }
}
