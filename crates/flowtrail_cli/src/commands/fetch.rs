use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use flowtrail::sync::{BatchResult, RepositoryProcessor, run_batch};
use flowtrail::{ContentCache, CredentialPool, GitHubClient, ProvenanceTracker};

use crate::FetchArgs;
use crate::config::Config;
use crate::progress::ProgressReporter;

/// Fetch options after applying CLI flags over configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FetchOptions {
    pub(crate) repolist: PathBuf,
    pub(crate) tokenlist: Option<PathBuf>,
    pub(crate) workers: usize,
    pub(crate) watched_path: String,
    pub(crate) cache_dir: PathBuf,
    pub(crate) tracker_file: PathBuf,
    pub(crate) api_url: String,
    pub(crate) timeout: Duration,
}

impl FetchOptions {
    pub(crate) fn resolve(args: FetchArgs, config: &Config) -> Self {
        Self {
            repolist: args.repolist,
            tokenlist: args.tokenlist.or_else(|| config.github.tokenlist.clone()),
            workers: args.workers.unwrap_or(config.crawl.workers).max(1),
            watched_path: args
                .path
                .unwrap_or_else(|| config.crawl.watched_path.clone()),
            cache_dir: args
                .cache_dir
                .unwrap_or_else(|| config.crawl.cache_dir.clone()),
            tracker_file: args
                .tracker
                .unwrap_or_else(|| config.crawl.tracker_file.clone()),
            api_url: args
                .api_url
                .unwrap_or_else(|| config.github.api_url.clone()),
            timeout: match args.timeout_secs {
                Some(secs) if secs > 0 => Duration::from_secs(secs),
                _ => config.request_timeout(),
            },
        }
    }
}

/// Read newline-delimited `owner/repo` lines, dropping blanks.
pub(crate) fn read_repository_list(path: &Path) -> io::Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Load the token pool. A token list path is required; an empty file is
/// accepted and leaves requests unauthenticated.
fn load_credentials(path: Option<&Path>) -> Result<CredentialPool, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Err(
            "no token list given: pass --tokenlist or set github.tokenlist in the config".into(),
        );
    };

    let pool = CredentialPool::from_file(path)
        .map_err(|e| format!("failed to read token list {}: {e}", path.display()))?;
    if pool.is_empty() {
        tracing::warn!(path = %path.display(), "Token list is empty, requests will be unauthenticated");
    }
    Ok(pool)
}

pub(crate) async fn handle_fetch(
    args: FetchArgs,
    config: &Config,
) -> Result<BatchResult, Box<dyn std::error::Error>> {
    let options = FetchOptions::resolve(args, config);
    let credentials = load_credentials(options.tokenlist.as_deref())?;

    let inputs = read_repository_list(&options.repolist).map_err(|e| {
        format!(
            "failed to read repository list {}: {e}",
            options.repolist.display()
        )
    })?;
    tracing::debug!(
        repositories = inputs.len(),
        tokens = credentials.len(),
        workers = options.workers,
        "Loaded inputs"
    );

    let transport = flowtrail::http::ReqwestTransport::with_timeout(options.timeout)?;
    let client = GitHubClient::with_transport(&options.api_url, Arc::new(transport), credentials)?;
    let tracker = Arc::new(ProvenanceTracker::open(&options.tracker_file).await?);
    let processor = Arc::new(
        RepositoryProcessor::new(client, ContentCache::new(&options.cache_dir), tracker)
            .with_watched_path(options.watched_path),
    );

    let reporter = Arc::new(ProgressReporter::new());
    let result = run_batch(
        processor,
        inputs,
        options.workers,
        Some(reporter.as_callback()),
    )
    .await;

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(repolist: &str) -> FetchArgs {
        FetchArgs {
            repolist: PathBuf::from(repolist),
            tokenlist: None,
            workers: None,
            path: None,
            cache_dir: None,
            tracker: None,
            api_url: None,
            timeout_secs: None,
        }
    }

    #[test]
    fn resolve_uses_config_defaults() {
        let options = FetchOptions::resolve(args("repos.txt"), &Config::default());

        assert_eq!(options.repolist, PathBuf::from("repos.txt"));
        assert_eq!(options.tokenlist, None);
        assert_eq!(options.workers, 25);
        assert_eq!(options.watched_path, ".github/workflows");
        assert_eq!(options.cache_dir, PathBuf::from("cache"));
        assert_eq!(options.tracker_file, PathBuf::from("cachetracker.json"));
        assert_eq!(options.api_url, "https://api.github.com");
        assert_eq!(options.timeout, Duration::from_secs(30));
    }

    #[test]
    fn flags_override_config() {
        let mut config = Config::default();
        config.github.tokenlist = Some(PathBuf::from("config-tokens.txt"));
        config.crawl.workers = 10;

        let mut flags = args("repos.txt");
        flags.tokenlist = Some(PathBuf::from("flag-tokens.txt"));
        flags.workers = Some(3);
        flags.path = Some(".circleci".to_string());
        flags.timeout_secs = Some(5);

        let options = FetchOptions::resolve(flags, &config);

        assert_eq!(options.tokenlist, Some(PathBuf::from("flag-tokens.txt")));
        assert_eq!(options.workers, 3);
        assert_eq!(options.watched_path, ".circleci");
        assert_eq!(options.timeout, Duration::from_secs(5));
    }

    #[test]
    fn zero_workers_is_clamped_to_one() {
        let mut flags = args("repos.txt");
        flags.workers = Some(0);
        let options = FetchOptions::resolve(flags, &Config::default());
        assert_eq!(options.workers, 1);
    }

    #[test]
    fn repository_list_drops_blank_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("repos.txt");
        std::fs::write(&path, "acme/widgets\n\n  \n  acme/gadgets  \n").unwrap();

        let repos = read_repository_list(&path).unwrap();
        assert_eq!(repos, ["acme/widgets", "acme/gadgets"]);
    }

    #[test]
    fn missing_repository_list_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(read_repository_list(&tmp.path().join("missing.txt")).is_err());
    }

    #[test]
    fn missing_token_list_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("tokens.txt");
        let err = load_credentials(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("failed to read token list"));
    }

    #[test]
    fn token_list_is_loaded() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tokens.txt");
        std::fs::write(&path, "ghp_one\n\nghp_two\n").unwrap();

        let pool = load_credentials(Some(&path)).unwrap();
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn empty_token_list_is_accepted() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tokens.txt");
        std::fs::write(&path, "\n  \n").unwrap();

        assert!(load_credentials(Some(&path)).unwrap().is_empty());
    }

    #[test]
    fn unset_token_list_is_fatal() {
        let err = load_credentials(None).unwrap_err();
        assert!(err.to_string().contains("no token list given"));
    }

    #[tokio::test]
    async fn fetch_without_token_list_fails_before_any_work() {
        let tmp = tempfile::tempdir().unwrap();
        let repolist = tmp.path().join("repos.txt");
        std::fs::write(&repolist, "acme/widgets\n").unwrap();

        let mut config = Config::default();
        config.crawl.cache_dir = tmp.path().join("cache");
        config.crawl.tracker_file = tmp.path().join("cachetracker.json");

        let err = handle_fetch(args(repolist.to_str().unwrap()), &config)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("no token list given"));
        assert!(!config.crawl.cache_dir.exists());
        assert!(!config.crawl.tracker_file.exists());
    }
}
