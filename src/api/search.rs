//! External catalog search page
//!
//! A non-empty query runs the search-and-ingest flow; results render from
//! local rows, so anything shown here is immediately followable. Catalog
//! failures stop at this handler and come back as a notice on the page,
//! never as a bare 500.

use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Extension, Router,
};
use serde::Deserialize;

use crate::api::auth::RequestContext;
use crate::api::ui;
use crate::services::catalog::CatalogError;
use crate::services::ingest;
use crate::{AppError, AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// GET and POST /search
///
/// A blank or missing query renders the empty form without touching the
/// catalog.
async fn search(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(params): Query<SearchParams>,
) -> AppResult<Html<String>> {
    let viewer = ctx.user.as_ref();
    let query = params.q.as_deref().map(str::trim).unwrap_or("");

    if query.is_empty() {
        return Ok(Html(ui::render_search(viewer, "", None, None)));
    }

    match ingest::search_and_ingest(&state.db, &state.catalog, query).await {
        Ok(outcome) => Ok(Html(ui::render_search(viewer, query, Some(&outcome), None))),
        Err(AppError::Catalog(err)) => {
            let notice = match err {
                CatalogError::MissingCredentials => {
                    "Catalog search is not configured on this server."
                }
                other => {
                    tracing::error!("Catalog search failed: {}", other);
                    "The music catalog could not be reached. Try again later."
                }
            };
            Ok(Html(ui::render_search(viewer, query, None, Some(notice))))
        }
        Err(e) => Err(e),
    }
}

/// Catalog search routes. POST is accepted alongside GET and reads the
/// same query parameter.
pub fn search_routes() -> Router<AppState> {
    Router::new().route("/search", get(search).post(search))
}
