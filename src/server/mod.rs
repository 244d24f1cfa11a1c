//! HTTP surface: credential routes, the reasoning stream, and the UI page.

pub mod error;
pub mod routes;

pub use error::ApiError;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Settings;
use crate::credentials::CredentialStore;
use crate::provider::Gateway;
use crate::reasoning::{Reasoner, ReasoningConfig};

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<CredentialStore>,
    pub gateway: Arc<dyn Gateway>,
    pub reasoner: Arc<Reasoner>,
}

impl AppState {
    pub fn new(gateway: Arc<dyn Gateway>, reasoning: ReasoningConfig) -> Self {
        Self {
            credentials: Arc::new(CredentialStore::new()),
            reasoner: Arc::new(Reasoner::new(Arc::clone(&gateway), reasoning)),
            gateway,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route(
            "/api/credentials",
            get(routes::list_credentials).post(routes::save_credential),
        )
        .route("/api/chain-of-thought", post(routes::chain_of_thought))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind, optionally open the browser, and serve until Ctrl+C.
pub async fn serve(settings: &Settings, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(settings.bind)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind))?;
    info!(addr = %listener.local_addr()?, "listening");

    if settings.open_browser {
        let url = settings.ui_url();
        // Headless machines have no browser; the URL is in the banner anyway.
        if let Err(e) = open::that(&url) {
            warn!("could not open {url}: {e}");
        }
    }

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("server error")?;

    info!("shut down");
    Ok(())
}
