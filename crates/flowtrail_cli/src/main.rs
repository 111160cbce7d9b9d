//! Flowtrail CLI - crawl the history of CI workflow files across repositories.

mod commands;
mod config;
mod progress;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::Term;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flowtrail")]
#[command(version)]
#[command(about = "Crawl the history of CI workflow files across repositories")]
#[command(
    long_about = "Flowtrail walks the revision history of a watched path (.github/workflows by \
default) for every repository in a list, stores each file version in a local content cache \
and appends a provenance record for it to a newline-delimited JSON tracker. Revisions that are \
already cached are served locally without touching the network."
)]
#[command(after_long_help = r#"EXAMPLES
    Crawl every repository in repos.txt with two tokens rotating:
        $ flowtrail fetch --repolist repos.txt --tokenlist tokens.txt

    Use fewer workers and a different cache location:
        $ flowtrail fetch -r repos.txt -w 8 --cache-dir /var/cache/flowtrail

    Generate shell completions:
        $ flowtrail completions bash > ~/.local/share/bash-completion/completions/flowtrail

CONFIGURATION
    Flowtrail reads configuration from:
      1. ~/.config/flowtrail/config.toml (or $XDG_CONFIG_HOME/flowtrail/config.toml)
      2. ./flowtrail.toml
      3. Environment variables (FLOWTRAIL_* prefix, e.g., FLOWTRAIL_CRAWL__WORKERS)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    FLOWTRAIL_GITHUB__API_URL       REST API base URL (default: https://api.github.com)
    FLOWTRAIL_GITHUB__TOKENLIST     File with one access token per line
    FLOWTRAIL_GITHUB__TIMEOUT_SECS  Per-request timeout in seconds (default: 30)
    FLOWTRAIL_CRAWL__WORKERS        Concurrent repositories (default: 25)
    FLOWTRAIL_CRAWL__CACHE_DIR      Content cache root (default: cache)
    FLOWTRAIL_CRAWL__TRACKER_FILE   Provenance log (default: cachetracker.json)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl workflow file history for a list of repositories
    Fetch(FetchArgs),
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Debug, Clone, clap::Args)]
struct FetchArgs {
    /// File with one `owner/repo` per line
    #[arg(short = 'r', long)]
    repolist: PathBuf,

    /// File with one access token per line (required unless set in config)
    #[arg(short = 't', long)]
    tokenlist: Option<PathBuf>,

    /// Maximum repositories processed concurrently (default from config or 25)
    #[arg(short = 'w', long)]
    workers: Option<usize>,

    /// Repository path whose history is crawled (default: .github/workflows)
    #[arg(short = 'p', long)]
    path: Option<String>,

    /// Content cache root (default: cache)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Provenance tracker file (default: cachetracker.json)
    #[arg(long)]
    tracker: Option<PathBuf>,

    /// REST API base URL (default: https://api.github.com)
    #[arg(long)]
    api_url: Option<String>,

    /// Per-request timeout in seconds (default from config or 30)
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Structured logs on stderr. On a TTY the interactive reporter owns
    // stdout, so only warnings and errors are logged by default.
    let default_filter = if Term::stdout().is_term() {
        "warn"
    } else {
        "flowtrail=info,flowtrail_cli=info"
    };
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(default_filter),
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration (config file -> env vars -> defaults)
    let config = config::Config::load();

    let cli = Cli::parse();

    match cli.command {
        Commands::Completions { shell } => {
            commands::meta::handle_completions(shell)?;
        }
        Commands::Fetch(args) => {
            let result = commands::fetch::handle_fetch(args, &config).await?;
            if result.has_failures() {
                tracing::error!(failed = result.failed(), "Some repositories failed");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
