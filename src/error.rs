//! Error types for tracknest
//!
//! All handlers return [`AppResult`]. Failures that escape a handler are
//! rendered as full HTML pages here, since every route in this service is
//! server-rendered.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use thiserror::Error;
use tracing::error;

use crate::services::catalog::CatalogError;
use crate::session::SessionError;

/// Response-extension marker set on typed not-found bodies. They render
/// anonymously here; the identity middleware swaps in the viewer's nav
/// once the session is known.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NotFoundPage;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing user/track id or unknown path (404 page)
    #[error("not found")]
    NotFound,

    /// Login-required action attempted without a session
    #[error("access unauthorized")]
    Unauthorized,

    /// Username or email collided with an existing account
    #[error("username already taken")]
    UsernameTaken,

    /// Storage fault
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing/verification fault
    #[error("password hashing error: {0}")]
    Password(#[from] bcrypt::BcryptError),

    /// Session token fault
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// External catalog fault
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => {
                let mut response = (
                    StatusCode::NOT_FOUND,
                    Html(crate::api::ui::render_not_found(None)),
                )
                    .into_response();
                response.extensions_mut().insert(NotFoundPage);
                response
            }
            AppError::Unauthorized => Redirect::to("/?flash=unauthorized").into_response(),
            AppError::UsernameTaken => (
                StatusCode::BAD_REQUEST,
                Html(crate::api::ui::render_error_page("Username already taken")),
            )
                .into_response(),
            AppError::Catalog(ref err) => {
                error!("Catalog request failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(crate::api::ui::render_error_page(
                        "The music catalog could not be reached",
                    )),
                )
                    .into_response()
            }
            AppError::Database(ref err) => {
                error!("Database error: {}", err);
                internal_error_page()
            }
            AppError::Password(ref err) => {
                error!("Password hashing error: {}", err);
                internal_error_page()
            }
            AppError::Session(ref err) => {
                error!("Session token error: {}", err);
                internal_error_page()
            }
        }
    }
}

fn internal_error_page() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(crate::api::ui::render_error_page("Something went wrong")),
    )
        .into_response()
}

/// Result type for handlers and storage operations
pub type AppResult<T> = Result<T, AppError>;
