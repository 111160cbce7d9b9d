//! Configuration file support for flowtrail.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `FLOWTRAIL_`, sections separated
//!    by a double underscore, e.g. `FLOWTRAIL_CRAWL__WORKERS`)
//! 3. Config file (./flowtrail.toml, then ~/.config/flowtrail/config.toml)
//! 4. Built-in defaults
//!
//! Example config file:
//! ```toml
//! [github]
//! api_url = "https://api.github.com"
//! tokenlist = "tokens.txt"
//! timeout_secs = 30
//!
//! [crawl]
//! workers = 25
//! watched_path = ".github/workflows"
//! cache_dir = "cache"
//! tracker_file = "cachetracker.json"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use flowtrail::cache::DEFAULT_CACHE_DIR;
use flowtrail::github::DEFAULT_API_URL;
use flowtrail::http::DEFAULT_REQUEST_TIMEOUT;
use flowtrail::sync::{DEFAULT_WATCHED_PATH, DEFAULT_WORKERS};
use flowtrail::tracker::DEFAULT_TRACKER_FILE;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote API configuration.
    pub github: GitHubConfig,
    /// Default crawl options.
    pub crawl: CrawlConfig,
}

/// Remote API configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Base URL of the REST API, e.g. a GitHub Enterprise `/api/v3` root.
    pub api_url: String,
    /// File with one access token per line.
    pub tokenlist: Option<PathBuf>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            tokenlist: None,
            timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
        }
    }
}

/// Default crawl options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Maximum repositories processed concurrently.
    pub workers: usize,
    /// Repository path whose history is crawled.
    pub watched_path: String,
    /// Root of the content cache.
    pub cache_dir: PathBuf,
    /// Newline-delimited JSON provenance log.
    pub tracker_file: PathBuf,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            watched_path: DEFAULT_WATCHED_PATH.to_string(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            tracker_file: PathBuf::from(DEFAULT_TRACKER_FILE),
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/flowtrail/config.toml)
    /// 3. Local config file (./flowtrail.toml)
    /// 4. Environment variables with FLOWTRAIL_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(config_path) = Self::default_config_path()
            && config_path.exists()
        {
            tracing::debug!("Loading config from {:?}", config_path);
            builder = builder.add_source(
                File::from(config_path)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local_config = PathBuf::from("flowtrail.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./flowtrail.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // e.g., FLOWTRAIL_CRAWL__CACHE_DIR -> crawl.cache_dir
        builder = builder.add_source(
            Environment::with_prefix("FLOWTRAIL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// Per-request timeout. Zero is treated as the default.
    pub fn request_timeout(&self) -> Duration {
        match self.github.timeout_secs {
            0 => DEFAULT_REQUEST_TIMEOUT,
            secs => Duration::from_secs(secs),
        }
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "flowtrail").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
