//! Bounded fan-out of repository tasks.
//!
//! Every distinct repository becomes one task. A semaphore caps how many run
//! at once and a `JoinSet` owns them all, so each outcome is observed,
//! including tasks that panic. One repository failing never cancels its
//! siblings.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::{Id, JoinSet};

use super::processor::RepositoryProcessor;
use super::progress::{CrawlProgress, ProgressCallback, emit};
use super::types::{BatchResult, RepoOutcome, RepositoryResult};
use crate::model::RepositoryRef;

/// Process every non-blank input line with at most `workers` in flight.
///
/// Lines naming a repository already seen earlier in the batch are skipped,
/// so each repository is walked by exactly one task. Returns once every task
/// has finished. Empty input returns immediately without emitting any event.
pub async fn run_batch(
    processor: Arc<RepositoryProcessor>,
    inputs: Vec<String>,
    workers: usize,
    on_progress: Option<ProgressCallback>,
) -> BatchResult {
    let mut result = BatchResult::default();

    let inputs: Vec<String> = inputs
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    if inputs.is_empty() {
        return result;
    }

    let total = inputs.len();
    let (inputs, duplicates) = partition_duplicates(inputs);
    let workers = workers.max(1).min(inputs.len());
    let on_progress = on_progress.map(Arc::new);

    emit(
        on_progress.as_deref(),
        CrawlProgress::BatchStarted {
            repositories: total,
            workers,
        },
    );
    tracing::info!(repositories = total, workers, "Starting batch");

    for (input, first) in duplicates {
        tracing::debug!(input = %input, first = %first, "Skipping duplicate repository");
        let outcome = RepoOutcome::Skipped {
            reason: format!("duplicate of {first}"),
        };
        report(on_progress.as_deref(), &input, &outcome);
        result.repositories.push(RepositoryResult { input, outcome });
    }

    let semaphore = Arc::new(Semaphore::new(workers));
    let mut join_set: JoinSet<RepoOutcome> = JoinSet::new();
    let mut pending: HashMap<Id, String> = HashMap::with_capacity(inputs.len());

    for input in inputs {
        let processor = Arc::clone(&processor);
        let semaphore = Arc::clone(&semaphore);
        let on_progress = on_progress.clone();
        let task_input = input.clone();

        let handle = join_set.spawn(async move {
            let _permit = match semaphore.acquire().await {
                Ok(permit) => permit,
                Err(_) => {
                    return RepoOutcome::Failed {
                        error: "Semaphore closed unexpectedly".to_string(),
                    };
                }
            };
            processor.process(&task_input, on_progress.as_deref()).await
        });
        pending.insert(handle.id(), input);
    }

    while let Some(joined) = join_set.join_next_with_id().await {
        let (input, outcome) = match joined {
            Ok((id, outcome)) => (pending.remove(&id).unwrap_or_default(), outcome),
            Err(err) => {
                let input = pending.remove(&err.id()).unwrap_or_default();
                tracing::debug!(input = %input, error = %err, "Repository task failed");
                let outcome = RepoOutcome::Failed {
                    error: format!("repository task failed: {err}"),
                };
                (input, outcome)
            }
        };

        report(on_progress.as_deref(), &input, &outcome);
        result.repositories.push(RepositoryResult { input, outcome });
    }

    emit(
        on_progress.as_deref(),
        CrawlProgress::BatchComplete {
            completed: result.completed(),
            skipped: result.skipped(),
            failed: result.failed(),
        },
    );
    tracing::info!(
        completed = result.completed(),
        skipped = result.skipped(),
        failed = result.failed(),
        "Batch complete"
    );

    result
}

/// Split `inputs` into lines to process and `(duplicate, first)` pairs.
///
/// Lines that do not parse are kept so the processor reports them.
fn partition_duplicates(inputs: Vec<String>) -> (Vec<String>, Vec<(String, String)>) {
    let mut first_seen: HashMap<RepositoryRef, String> = HashMap::new();
    let mut unique = Vec::with_capacity(inputs.len());
    let mut duplicates = Vec::new();

    for input in inputs {
        let Ok(repo) = input.parse::<RepositoryRef>() else {
            unique.push(input);
            continue;
        };
        match first_seen.entry(repo) {
            Entry::Occupied(first) => duplicates.push((input, first.get().clone())),
            Entry::Vacant(slot) => {
                slot.insert(input.clone());
                unique.push(input);
            }
        }
    }

    (unique, duplicates)
}

fn report(on_progress: Option<&ProgressCallback>, input: &str, outcome: &RepoOutcome) {
    let event = match outcome {
        RepoOutcome::Completed(stats) => CrawlProgress::RepositoryFinished {
            repository: input.to_string(),
            stats: *stats,
        },
        RepoOutcome::Skipped { reason } => CrawlProgress::RepositorySkipped {
            input: input.to_string(),
            reason: reason.clone(),
        },
        RepoOutcome::Failed { error } => CrawlProgress::RepositoryFailed {
            repository: input.to_string(),
            error: error.clone(),
        },
    };
    emit(on_progress, event);
}
