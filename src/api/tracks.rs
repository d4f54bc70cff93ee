//! Track listing and detail pages

use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    routing::get,
    Extension, Router,
};
use serde::Deserialize;

use crate::api::auth::RequestContext;
use crate::api::ui;
use crate::db;
use crate::{AppError, AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Optional name filter, matched as a case-insensitive substring
    pub q: Option<String>,
}

/// GET /tracks
async fn list_tracks(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(params): Query<ListParams>,
) -> AppResult<Html<String>> {
    let tracks = db::tracks::list_tracks(&state.db, params.q.as_deref()).await?;
    Ok(Html(ui::render_tracks(
        ctx.user.as_ref(),
        &tracks,
        params.q.as_deref(),
    )))
}

/// GET /tracks/:id
async fn show_track(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let track_id: i64 = id.parse().map_err(|_| AppError::NotFound)?;
    let track = db::tracks::get_track_or_404(&state.db, track_id).await?;

    let is_following = match ctx.user.as_ref() {
        Some(user) => db::follows::is_following(&state.db, user.id, track.id).await?,
        None => false,
    };

    Ok(Html(ui::render_track_detail(
        ctx.user.as_ref(),
        &track,
        is_following,
    )))
}

/// GET /tracks/by-catalog-id/:catalog_id
///
/// Stable link from an external catalog id to the local detail page. 404
/// when the id was never ingested.
async fn show_by_catalog_id(
    State(state): State<AppState>,
    Path(catalog_id): Path<String>,
) -> AppResult<Redirect> {
    let track = db::tracks::find_by_catalog_id(&state.db, &catalog_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Redirect::to(&format!("/tracks/{}", track.id)))
}

/// Public track pages
pub fn track_routes() -> Router<AppState> {
    Router::new()
        .route("/tracks", get(list_tracks))
        .route("/tracks/:id", get(show_track))
        .route("/tracks/by-catalog-id/:catalog_id", get(show_by_catalog_id))
}
