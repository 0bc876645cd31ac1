//! Vigia Console — JSON admin API served from the binary.
//!
//! Exposes the reconciliation, identity resolution, and ticket workflow
//! over a small authenticated HTTP surface. All responses are JSON; the
//! single-page frontend that consumes them is deployed separately.

use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use vigia_core::config::VigiaConfig;
use vigia_core::db::sqlite::SqliteRepository;
use vigia_core::sgu::SguClient;
use vigia_directory::{DirectoryClient, Resolver};

pub mod api;
pub mod auth;

/// Shared application state for all console routes.
pub struct AppState {
    pub repo: Arc<SqliteRepository>,
    pub config: VigiaConfig,
    pub resolver: Resolver<SqliteRepository, DirectoryClient, SguClient>,
    pub sgu: SguClient,
}

impl AppState {
    /// Wire up the state from loaded configuration and an open repository.
    pub fn new(config: VigiaConfig, repo: Arc<SqliteRepository>, sgu: SguClient) -> Self {
        let directory = DirectoryClient::new(&config.directory);
        let resolver = Resolver::new(repo.clone(), directory, sgu.clone());
        Self {
            repo,
            config,
            resolver,
            sgu,
        }
    }
}

/// Build the console router with all routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api::api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ))
        .with_state(state)
}

// -- Health --

async fn health() -> &'static str {
    "ok"
}
