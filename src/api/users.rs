//! User profile pages and library actions
//!
//! The profile page is public. Everything that mutates a library or an
//! account lives in [`library_routes`] and runs behind the login gate.
//! Follow and unfollow both resolve the track first, so a missing id is
//! the same typed not-found from either path.

use axum::{
    extract::{Path, Query, State},
    http::header::SET_COOKIE,
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Extension, Form, Router,
};

use crate::api::auth::{CurrentUser, RequestContext};
use crate::api::ui::{self, Flash, FlashParams};
use crate::db;
use crate::forms::{FieldError, ProfileForm};
use crate::session;
use crate::{AppError, AppResult, AppState};

/// GET /users/:id
async fn show_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Query(params): Query<FlashParams>,
) -> AppResult<Html<String>> {
    let user_id: i64 = id.parse().map_err(|_| AppError::NotFound)?;

    let user = db::users::get_user(&state.db, user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let tracks = db::follows::tracks_for_user(&state.db, user.id).await?;

    Ok(Html(ui::render_profile(
        ctx.user.as_ref(),
        &user,
        &tracks,
        Flash::from_query(params.flash.as_deref()),
    )))
}

/// POST /users/follow/:track_id
async fn follow_track(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(track_id): Path<i64>,
) -> AppResult<Redirect> {
    let track = db::tracks::get_track_or_404(&state.db, track_id).await?;
    db::follows::follow(&state.db, user.id, track.id).await?;

    tracing::debug!(user_id = user.id, track_id = track.id, "Track followed");
    Ok(Redirect::to(&format!("/users/{}", user.id)))
}

/// POST /users/stop-following/:track_id
async fn stop_following_track(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(track_id): Path<i64>,
) -> AppResult<Redirect> {
    let track = db::tracks::get_track_or_404(&state.db, track_id).await?;
    db::follows::unfollow(&state.db, user.id, track.id).await?;

    tracing::debug!(user_id = user.id, track_id = track.id, "Track unfollowed");
    Ok(Redirect::to(&format!("/users/{}", user.id)))
}

/// GET /users/profile
async fn profile_page(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Html<String> {
    let form = ProfileForm {
        username: user.username.clone(),
        email: user.email.clone(),
        password: String::new(),
    };
    Html(ui::render_profile_edit(&user, &form, &[], None))
}

/// POST /users/profile
///
/// Username/email changes require the account's current password; the form
/// re-renders on a wrong password or a name collision.
async fn profile_submit(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Form(form): Form<ProfileForm>,
) -> AppResult<Response> {
    let errors = form.validate();
    if !errors.is_empty() {
        return Ok(Html(ui::render_profile_edit(&user, &form, &errors, None)).into_response());
    }

    let verified = db::users::authenticate(&state.db, &user.username, &form.password).await?;
    if verified.is_none() {
        return Ok(Html(ui::render_profile_edit(
            &user,
            &form,
            &[],
            Some(Flash::InvalidCredentials),
        ))
        .into_response());
    }

    match db::users::update_profile(&state.db, user.id, &form.username, &form.email).await {
        Ok(()) => {
            tracing::info!(user_id = user.id, "Profile updated");
            Ok(
                ui::flash_redirect(&format!("/users/{}", user.id), Flash::ProfileUpdated)
                    .into_response(),
            )
        }
        Err(AppError::UsernameTaken) => {
            let errors = [FieldError {
                field: "username",
                message: "Username already taken",
            }];
            Ok(Html(ui::render_profile_edit(&user, &form, &errors, None)).into_response())
        }
        Err(e) => Err(e),
    }
}

/// POST /users/delete
async fn delete_account(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<impl IntoResponse> {
    db::users::delete_user(&state.db, user.id).await?;

    tracing::info!(user_id = user.id, username = %user.username, "Account deleted");
    Ok((
        AppendHeaders([(SET_COOKIE, session::clear_session_cookie())]),
        ui::flash_redirect("/signup", Flash::AccountDeleted),
    ))
}

/// Public user pages
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users/:id", get(show_user))
}

/// Library and account actions; mount behind [`crate::api::require_login`]
pub fn library_routes() -> Router<AppState> {
    Router::new()
        .route("/users/follow/:track_id", post(follow_track))
        .route("/users/stop-following/:track_id", post(stop_following_track))
        .route("/users/profile", get(profile_page).post(profile_submit))
        .route("/users/delete", post(delete_account))
}
