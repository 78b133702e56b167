//! Runtime configuration.
//!
//! Every option can come from the command line or from a `GIT_BROWSE_*`
//! environment variable.

use std::time::Duration;

use clap::Parser;

/// Git Browse - history-aware JSON browser for a git repository
#[derive(Parser, Debug, Clone)]
#[command(name = "git-browse")]
#[command(about = "Browse a git repository's trees, history, diffs and blame", long_about = None)]
pub struct Config {
    /// Path to the git repository to serve
    #[arg(value_name = "REPO_PATH", env = "GIT_BROWSE_REPO")]
    pub repo_path: String,

    /// Port to run the server on
    #[arg(short, long, default_value = "3001", env = "GIT_BROWSE_PORT")]
    pub port: u16,

    /// Address to bind to
    #[arg(long, default_value = "127.0.0.1", env = "GIT_BROWSE_BIND")]
    pub bind: String,

    /// Branch used when a request names no ref
    #[arg(long, env = "GIT_BROWSE_DEFAULT_BRANCH")]
    pub default_branch: Option<String>,

    /// Maximum number of memoized entries (0 disables the cache)
    #[arg(long, default_value = "10000", env = "GIT_BROWSE_CACHE_CAPACITY")]
    pub cache_capacity: u64,

    /// Commits returned per history page
    #[arg(long, default_value = "50", env = "GIT_BROWSE_PAGE_SIZE")]
    pub page_size: usize,

    /// Time limit for archive and patch generation
    #[arg(long, default_value = "30", env = "GIT_BROWSE_EXPORT_TIMEOUT_SECS")]
    pub export_timeout_secs: u64,
}

impl Config {
    pub fn export_timeout(&self) -> Duration {
        Duration::from_secs(self.export_timeout_secs)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
