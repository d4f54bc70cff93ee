//! tracknest library - personal track library over an external music catalog
//!
//! Users sign up, search the catalog, and follow tracks into a personal
//! library. Searched tracks are ingested lazily into local storage together
//! with their audio features, so everything rendered here is served from
//! local rows.

use std::sync::Arc;

use axum::{middleware, Router};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod models;
pub mod services;
pub mod session;

pub use error::{AppError, AppResult};

use config::Config;
use services::catalog::CatalogClient;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// External catalog client with its token cache
    pub catalog: Arc<CatalogClient>,
    /// Resolved configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, catalog: CatalogClient, config: Config) -> Self {
        Self {
            db,
            catalog: Arc::new(catalog),
            config: Arc::new(config),
        }
    }
}

/// Build application router
///
/// Identity middleware wraps every route including the fallback, so each
/// handler can read the resolved [`api::RequestContext`]. Library and
/// account mutations additionally sit behind [`api::require_login`].
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(api::library_routes())
        .layer(middleware::from_fn(api::require_login));

    Router::new()
        .merge(api::page_routes())
        .merge(api::auth_routes())
        .merge(api::user_routes())
        .merge(api::track_routes())
        .merge(api::search_routes())
        .merge(api::health_routes())
        .merge(protected)
        .fallback(api::ui::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::identity_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
