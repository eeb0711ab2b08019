// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! HTTP server for rampup.
//!
//! Exposes the analysis pipeline and repository chat assistant from
//! `rampup-core` as a JSON API under `/api`. Jobs live in an in-memory
//! store for the process lifetime; credentials come from the environment,
//! with per-request API-key overrides.

use std::net::SocketAddr;
use std::sync::Arc;

use octocrab::Octocrab;
use tokio::net::TcpListener;

use rampup_core::{AiConfig, AnalysisStore, BatchPolicy, KeyResolver, MemoryStore, build_client};

mod api;
mod auth;
mod error;
pub mod logging;

pub use api::router;
pub use auth::EnvKeys;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Job storage.
    pub store: Arc<dyn AnalysisStore>,
    /// Credential source.
    pub keys: Arc<dyn KeyResolver>,
    /// GitHub client, authenticated when `GITHUB_TOKEN` is set.
    pub github: Octocrab,
    /// Batch policy for analysis jobs.
    pub policy: BatchPolicy,
    /// AI request settings.
    pub ai: AiConfig,
}

/// Runs the HTTP server until Ctrl+C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn run(host: &str, port: u16) -> anyhow::Result<()> {
    let keys = EnvKeys;
    let github = build_client(keys.github_token())?;

    let state = AppState {
        store: Arc::new(MemoryStore::new()),
        keys: Arc::new(keys),
        github,
        policy: BatchPolicy::default(),
        ai: AiConfig::default(),
    };

    let router = router(state);

    // Handle both IPv4 and IPv6 addresses
    let addr: SocketAddr = if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
    .parse()?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
            tracing::info!("Received Ctrl+C, shutting down gracefully");
        })
        .await?;

    Ok(())
}
