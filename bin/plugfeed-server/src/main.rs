//! plugfeed-server – entry point.
//!
//! Startup order:
//! 1. Parse configuration from environment variables.
//! 2. Initialise structured tracing (JSON or pretty).
//! 3. Load the configuration file (token, tracked organizations).
//! 4. Build the GitHub client and the shared catalog state.
//! 5. Build the Axum router and start the HTTP server with graceful shutdown.
//!
//! The catalog starts with no resolved versions; it is filled by the first
//! call to `/update`.

mod config;
mod error;
mod middleware;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use plugfeed_github::GithubClientBuilder;
use tracing::{info, warn};

use crate::config::{Config, FileConfig};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Configuration ───────────────────────────────────────────────────────
    let mut cfg = Config::from_env();

    // ── 2. Tracing ─────────────────────────────────────────────────────────────
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match cfg.log_level.parse::<tracing_subscriber::EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: PLUGFEED_LOG='{}' is not a valid tracing filter ({}); \
                     falling back to 'info'",
                    cfg.log_level, e
                );
                tracing_subscriber::EnvFilter::new("info")
            }
        },
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true);

    if cfg.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!(version = env!("CARGO_PKG_VERSION"), "plugfeed-server starting");

    // ── 3. Configuration file ──────────────────────────────────────────────────
    match FileConfig::load(&cfg.config_file)? {
        Some(file) => {
            info!(path = %cfg.config_file, "configuration file loaded");
            cfg.merge_file(file);
        }
        None => warn!(path = %cfg.config_file, "configuration file not found; using defaults"),
    }
    if cfg.github_token.is_none() {
        warn!("no GitHub token configured; error reports will not be forwarded");
    }

    // ── 4. Shared application state ────────────────────────────────────────────
    let mut github = GithubClientBuilder::new()
        .set_api_base(cfg.github_api.clone())
        .set_timeout(Duration::from_secs(cfg.http_timeout_secs));
    if let Some(token) = &cfg.github_token {
        github = github.set_token(token.clone());
    }
    let github = Arc::new(github.build()?);

    let addr: SocketAddr = cfg.bind_address.parse()?;
    let state = Arc::new(AppState::new(cfg, Arc::clone(&github), github));
    let tracked = state.store.snapshot().repositories().count();
    info!(
        tracked,
        shape = %state.config.descriptor_shape,
        cooldown_secs = state.config.refresh_cooldown_secs,
        "catalog seeded"
    );

    // ── 5. HTTP server with graceful shutdown ──────────────────────────────────
    let app = routes::build(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("plugfeed-server stopped");
    Ok(())
}

/// Returns a future that resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received; starting graceful shutdown");
}
