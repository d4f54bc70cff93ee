//! HTTP handlers for tracknest

pub mod auth;
pub mod health;
pub mod search;
pub mod tracks;
pub mod ui;
pub mod users;

pub use auth::{auth_routes, identity_middleware, require_login, CurrentUser, RequestContext};
pub use health::health_routes;
pub use search::search_routes;
pub use tracks::track_routes;
pub use ui::page_routes;
pub use users::{library_routes, user_routes};
