//! Session identity middleware and the signup/login/logout handlers
//!
//! Identity is resolved exactly once per request: the outermost middleware
//! reads the session cookie, verifies the token, loads the user row, and
//! stores the result in request extensions as [`RequestContext`]. Handlers
//! never consult globals. Routes that need a logged-in user sit behind
//! [`require_login`], which either inserts [`CurrentUser`] or answers with
//! the unauthorized flash-redirect before the handler runs.

use axum::{
    extract::{Query, Request, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        StatusCode,
    },
    middleware::Next,
    response::{AppendHeaders, Html, IntoResponse, Response},
    routing::get,
    Form, Router,
};

use crate::api::ui::{self, Flash, FlashParams};
use crate::db;
use crate::error::NotFoundPage;
use crate::forms::{FieldError, LoginForm, SignupForm};
use crate::models::User;
use crate::session;
use crate::{AppError, AppResult, AppState};

/// Identity resolved for the current request. Present on every request
/// once [`identity_middleware`] has run.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user: Option<User>,
}

/// The logged-in user behind [`require_login`]
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Resolve the session cookie to a user, once per request
///
/// An expired, tampered, or orphaned token reads as logged out rather than
/// an error; the request proceeds anonymously.
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(session::token_from_cookie_header)
        .map(str::to_owned);

    let user = match token {
        Some(token) => match session::verify_token(&token, &state.config.session_secret) {
            Ok(user_id) => match db::users::get_user(&state.db, user_id).await {
                Ok(user) => user,
                Err(e) => {
                    tracing::error!("Identity lookup failed: {}", e);
                    None
                }
            },
            Err(_) => None,
        },
        None => None,
    };

    let viewer = user.clone();
    request.extensions_mut().insert(RequestContext { user });
    let response = next.run(request).await;

    // Typed not-found errors render before identity is in scope; give
    // their pages the logged-in nav here.
    if viewer.is_some() && response.extensions().get::<NotFoundPage>().is_some() {
        return (
            StatusCode::NOT_FOUND,
            Html(ui::render_not_found(viewer.as_ref())),
        )
            .into_response();
    }

    response
}

/// Gate for routes that only make sense when logged in
///
/// Runs after [`identity_middleware`]. Inserts [`CurrentUser`] on success;
/// otherwise the request ends here with the unauthorized flash-redirect.
pub async fn require_login(mut request: Request, next: Next) -> Response {
    let user = request
        .extensions()
        .get::<RequestContext>()
        .and_then(|ctx| ctx.user.clone());

    match user {
        Some(user) => {
            request.extensions_mut().insert(CurrentUser(user));
            next.run(request).await
        }
        None => AppError::Unauthorized.into_response(),
    }
}

/// GET /signup
///
/// Arriving at signup drops any live session, matching the posted form's
/// behavior below.
async fn signup_page(Query(params): Query<FlashParams>) -> impl IntoResponse {
    (
        AppendHeaders([(SET_COOKIE, session::clear_session_cookie())]),
        Html(ui::render_signup(
            &SignupForm::default(),
            &[],
            Flash::from_query(params.flash.as_deref()),
        )),
    )
}

/// POST /signup
async fn signup_submit(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> AppResult<Response> {
    let errors = form.validate();
    if !errors.is_empty() {
        return Ok((
            AppendHeaders([(SET_COOKIE, session::clear_session_cookie())]),
            Html(ui::render_signup(&form, &errors, None)),
        )
            .into_response());
    }

    match db::users::create_user(&state.db, &form.username, &form.email, &form.password).await {
        Ok(user) => {
            let token = session::issue_token(user.id, &state.config.session_secret)?;
            tracing::info!(user_id = user.id, username = %user.username, "New account created");
            Ok((
                AppendHeaders([(SET_COOKIE, session::session_cookie(&token))]),
                ui::flash_redirect("/", Flash::SignedUp),
            )
                .into_response())
        }
        Err(AppError::UsernameTaken) => {
            let errors = [FieldError {
                field: "username",
                message: "Username already taken",
            }];
            Ok((
                AppendHeaders([(SET_COOKIE, session::clear_session_cookie())]),
                Html(ui::render_signup(&form, &errors, None)),
            )
                .into_response())
        }
        Err(e) => Err(e),
    }
}

/// GET /login
async fn login_page(Query(params): Query<FlashParams>) -> Html<String> {
    Html(ui::render_login(
        &LoginForm::default(),
        &[],
        Flash::from_query(params.flash.as_deref()),
    ))
}

/// POST /login
async fn login_submit(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let errors = form.validate();
    if !errors.is_empty() {
        return Ok(Html(ui::render_login(&form, &errors, None)).into_response());
    }

    match db::users::authenticate(&state.db, &form.username, &form.password).await? {
        Some(user) => {
            let token = session::issue_token(user.id, &state.config.session_secret)?;
            tracing::info!(user_id = user.id, username = %user.username, "User logged in");
            Ok((
                AppendHeaders([(SET_COOKIE, session::session_cookie(&token))]),
                ui::flash_redirect("/", Flash::LoggedIn),
            )
                .into_response())
        }
        None => Ok(Html(ui::render_login(
            &form,
            &[],
            Some(Flash::InvalidCredentials),
        ))
        .into_response()),
    }
}

/// GET /logout
async fn logout() -> impl IntoResponse {
    (
        AppendHeaders([(SET_COOKIE, session::clear_session_cookie())]),
        ui::flash_redirect("/login", Flash::LoggedOut),
    )
}

/// Signup, login, and logout routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", get(signup_page).post(signup_submit))
        .route("/login", get(login_page).post(login_submit))
        .route("/logout", get(logout))
}
