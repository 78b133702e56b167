//! Git Browse - serve a git repository's trees, history and blame as JSON
//!
//! # Usage
//! ```bash
//! git-browse /path/to/repository                 # Start server
//! git-browse /path/to/repository --port 8080     # Different port
//! GIT_BROWSE_REPO=/srv/project.git git-browse    # From the environment
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use git_browse::cache::{Cache, MemoryCache, NoCache};
use git_browse::config::Config;
use git_browse::git::GitRepository;
use git_browse::routes::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing (quieter for production)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cache: Arc<dyn Cache> = if config.cache_capacity == 0 {
        tracing::info!("Memoization disabled");
        Arc::new(NoCache)
    } else {
        Arc::new(MemoryCache::new(config.cache_capacity))
    };

    // Open the git repository
    let repo = match GitRepository::open(&config.repo_path, config.default_branch.clone(), cache) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("✗ Failed to open repository: {}", e);
            eprintln!("  Path: {}", config.repo_path);
            std::process::exit(1);
        }
    };

    let canonical_path = std::fs::canonicalize(&config.repo_path)
        .unwrap_or_else(|_| PathBuf::from(&config.repo_path))
        .to_string_lossy()
        .to_string();

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let addr = config.listen_addr();
    let state = Arc::new(AppState { repo, config });

    let app = routes::create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("✗ Failed to bind to {}: {}", addr, e);
            eprintln!("  Try a different port with --port <PORT>");
            std::process::exit(1);
        }
    };

    println!();
    println!("  Repository: {}", canonical_path);
    println!("  API:        http://{}/api/v1/repository", addr);
    println!();
    println!("  Press Ctrl+C to stop");
    println!();

    // Set up graceful shutdown
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        println!("\n  Shutting down...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
