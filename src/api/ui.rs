//! Server-rendered HTML pages
//!
//! Every page is assembled from a shared layout plus a content fragment.
//! Flash banners travel between requests as typed codes on the redirect
//! query string; free text never enters a URL. All user-supplied strings
//! pass through [`escape_html`] before they reach a page.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
    routing::get,
    Extension, Router,
};
use serde::Deserialize;

use crate::api::auth::RequestContext;
use crate::db;
use crate::forms::{FieldError, LoginForm, ProfileForm, SignupForm};
use crate::models::{Track, User};
use crate::services::ingest::SearchOutcome;
use crate::{AppResult, AppState};

/// One-shot banner shown at the top of the next rendered page
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Flash {
    SignedUp,
    LoggedIn,
    LoggedOut,
    InvalidCredentials,
    Unauthorized,
    AccountDeleted,
    ProfileUpdated,
}

impl Flash {
    pub fn code(self) -> &'static str {
        match self {
            Flash::SignedUp => "signed_up",
            Flash::LoggedIn => "logged_in",
            Flash::LoggedOut => "logged_out",
            Flash::InvalidCredentials => "invalid_credentials",
            Flash::Unauthorized => "unauthorized",
            Flash::AccountDeleted => "account_deleted",
            Flash::ProfileUpdated => "profile_updated",
        }
    }

    /// Parse a code from a query string. Unknown codes render nothing.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "signed_up" => Some(Flash::SignedUp),
            "logged_in" => Some(Flash::LoggedIn),
            "logged_out" => Some(Flash::LoggedOut),
            "invalid_credentials" => Some(Flash::InvalidCredentials),
            "unauthorized" => Some(Flash::Unauthorized),
            "account_deleted" => Some(Flash::AccountDeleted),
            "profile_updated" => Some(Flash::ProfileUpdated),
            _ => None,
        }
    }

    pub fn from_query(code: Option<&str>) -> Option<Self> {
        code.and_then(Self::from_code)
    }

    fn message(self) -> &'static str {
        match self {
            Flash::SignedUp => "Welcome to Tracknest!",
            Flash::LoggedIn => "Welcome back!",
            Flash::LoggedOut => "You have been logged out.",
            Flash::InvalidCredentials => "Invalid credentials.",
            Flash::Unauthorized => "Access unauthorized.",
            Flash::AccountDeleted => "Your account has been deleted.",
            Flash::ProfileUpdated => "Profile updated.",
        }
    }

    fn kind(self) -> &'static str {
        match self {
            Flash::InvalidCredentials | Flash::Unauthorized => "danger",
            _ => "success",
        }
    }
}

/// Query-string carrier for the flash code
#[derive(Debug, Deserialize)]
pub struct FlashParams {
    pub flash: Option<String>,
}

/// Redirect whose target page renders the given banner
pub fn flash_redirect(path: &str, flash: Flash) -> Redirect {
    Redirect::to(&format!("{}?flash={}", path, flash.code()))
}

/// Escape text for embedding in HTML content or attribute values
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const STYLE: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; background-color: #1a1a1a; color: #e0e0e0; line-height: 1.6; }
header { background-color: #2a2a2a; border-bottom: 1px solid #3a3a3a; padding: 15px 20px; }
.header-content { display: flex; align-items: center; gap: 20px; max-width: 900px; margin: 0 auto; }
.brand { color: #4a9eff; font-size: 22px; font-weight: 600; text-decoration: none; }
nav { flex: 1; display: flex; gap: 15px; flex-wrap: wrap; }
nav a { color: #e0e0e0; text-decoration: none; }
nav a:hover { color: #4a9eff; }
.version { color: #888; font-size: 13px; font-family: 'Courier New', monospace; }
.container { max-width: 900px; margin: 0 auto; padding: 20px; }
h1 { color: #4a9eff; font-size: 26px; margin-bottom: 10px; }
h2 { color: #4a9eff; font-size: 20px; margin: 20px 0 10px; }
p { margin-bottom: 10px; }
a { color: #4a9eff; }
.flash { padding: 10px 15px; border-radius: 4px; margin-bottom: 20px; font-weight: 600; }
.flash-success { background: #10b981; color: #fff; }
.flash-danger { background: #ef4444; color: #fff; }
.panel { background: #2a2a2a; border: 1px solid #3a3a3a; border-radius: 4px; padding: 20px; margin-bottom: 20px; max-width: 460px; }
label { display: block; margin: 10px 0 4px; color: #aaa; }
input[type="text"], input[type="password"], input[type="email"] { width: 100%; max-width: 400px; padding: 8px; background: #1a1a1a; border: 1px solid #3a3a3a; border-radius: 4px; color: #e0e0e0; }
.button { display: inline-block; padding: 8px 18px; background: #4a9eff; color: #fff; border: none; border-radius: 4px; font-weight: 600; cursor: pointer; text-decoration: none; margin-top: 12px; }
.button:hover { background: #3a8eef; }
.button-small { padding: 4px 10px; font-size: 13px; margin-top: 0; }
.button-muted { background: #555; }
.button-muted:hover { background: #666; }
.button-danger { background: #ef4444; }
.button-danger:hover { background: #df3434; }
.field-error { color: #ef4444; font-size: 13px; margin: 2px 0 0; }
.inline-form { display: inline; }
.track-table { width: 100%; border-collapse: collapse; margin-top: 10px; }
.track-table th, .track-table td { text-align: left; padding: 8px 10px; border-bottom: 1px solid #3a3a3a; }
.track-table thead th { color: #888; font-size: 13px; text-transform: uppercase; }
.track-table .num { text-align: right; }
.feature-table { border-collapse: collapse; margin-top: 10px; }
.feature-table th { text-align: left; padding: 6px 20px 6px 0; color: #888; font-weight: normal; }
.feature-table td { padding: 6px 0; }
.empty { color: #888; font-style: italic; }
.muted { color: #888; font-size: 14px; }
.search-form { display: flex; gap: 10px; align-items: center; margin-bottom: 20px; }
.search-form input { max-width: 400px; }
.search-form .button { margin-top: 0; }
"#;

/// Shared page shell: header with nav, optional flash banner, content
pub fn layout(title: &str, viewer: Option<&User>, flash: Option<Flash>, content: &str) -> String {
    let nav = match viewer {
        Some(user) => format!(
            r#"<a href="/tracks">Tracks</a>
            <a href="/search">Search</a>
            <a href="/categories">Categories</a>
            <a href="/users/{id}">{username}</a>
            <a href="/users/profile">Settings</a>
            <a href="/logout">Log out</a>"#,
            id = user.id,
            username = escape_html(&user.username),
        ),
        None => r#"<a href="/tracks">Tracks</a>
            <a href="/search">Search</a>
            <a href="/categories">Categories</a>
            <a href="/login">Log in</a>
            <a href="/signup">Sign up</a>"#
            .to_string(),
    };

    let banner = match flash {
        Some(flash) => format!(
            r#"<div class="flash flash-{kind}">{message}</div>"#,
            kind = flash.kind(),
            message = flash.message(),
        ),
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - Tracknest</title>
    <style>{style}</style>
</head>
<body>
    <header>
        <div class="header-content">
            <a class="brand" href="/">Tracknest</a>
            <nav>{nav}</nav>
            <span class="version">v{version}</span>
        </div>
    </header>
    <main class="container">
        {banner}
        {content}
    </main>
</body>
</html>
"#,
        title = escape_html(title),
        style = STYLE,
        nav = nav,
        version = env!("CARGO_PKG_VERSION"),
        banner = banner,
        content = content,
    )
}

/// Per-row button rendered alongside a track listing
#[derive(Debug, Clone, Copy)]
enum TrackAction {
    None,
    Follow,
    Unfollow,
}

fn track_table(tracks: &[Track], action: TrackAction) -> String {
    if tracks.is_empty() {
        return r#"<p class="empty">Nothing here yet.</p>"#.to_string();
    }

    let mut rows = String::new();
    for track in tracks {
        let action_cell = match action {
            TrackAction::None => String::new(),
            TrackAction::Follow => format!(
                r#"<td><form method="post" action="/users/follow/{id}" class="inline-form"><button type="submit" class="button button-small">Follow</button></form></td>"#,
                id = track.id
            ),
            TrackAction::Unfollow => format!(
                r#"<td><form method="post" action="/users/stop-following/{id}" class="inline-form"><button type="submit" class="button button-small button-muted">Remove</button></form></td>"#,
                id = track.id
            ),
        };
        rows.push_str(&format!(
            r#"<tr>
                <td><a href="/tracks/{id}">{name}</a></td>
                <td>{artist}</td>
                <td>{album}</td>
                <td class="num">{duration}</td>
                {action_cell}
            </tr>"#,
            id = track.id,
            name = escape_html(&track.name),
            artist = escape_html(&track.artist),
            album = escape_html(&track.album),
            duration = track.duration_display(),
            action_cell = action_cell,
        ));
    }

    let action_header = match action {
        TrackAction::None => "",
        _ => "<th></th>",
    };

    format!(
        r#"<table class="track-table">
            <thead><tr><th>Name</th><th>Artist</th><th>Album</th><th class="num">Length</th>{action_header}</tr></thead>
            <tbody>{rows}</tbody>
        </table>"#,
        action_header = action_header,
        rows = rows,
    )
}

fn feature_rows(track: &Track) -> String {
    let f = &track.features;
    let rows = [
        ("Danceability", format!("{:.3}", f.danceability)),
        ("Energy", format!("{:.3}", f.energy)),
        ("Valence", format!("{:.3}", f.valence)),
        ("Acousticness", format!("{:.3}", f.acousticness)),
        ("Instrumentalness", format!("{:.3}", f.instrumentalness)),
        ("Liveness", format!("{:.3}", f.liveness)),
        ("Speechiness", format!("{:.3}", f.speechiness)),
        ("Tempo", format!("{:.1} BPM", f.tempo)),
        ("Loudness", format!("{:.1} dB", f.loudness)),
        ("Key", track.key_display()),
        ("Time signature", format!("{}/4", f.time_signature)),
        ("Length", track.duration_display()),
    ];

    rows.iter()
        .map(|(label, value)| format!("<tr><th>{}</th><td>{}</td></tr>", label, value))
        .collect()
}

/// Logged-in home page: the viewer's library
pub fn render_home_user(user: &User, tracks: &[Track], flash: Option<Flash>) -> String {
    let content = format!(
        r#"<h1>Your library</h1>
        <p class="muted">Tracks you follow, A to Z.</p>
        {table}
        <p><a class="button" href="/search">Find more tracks</a></p>"#,
        table = track_table(tracks, TrackAction::Unfollow),
    );
    layout("Home", Some(user), flash, &content)
}

/// Anonymous home page: welcome and signup prompt
pub fn render_home_anon(flash: Option<Flash>) -> String {
    let content = r#"<h1>Welcome to Tracknest</h1>
        <p>Search a worldwide music catalog, see the audio features behind
        every track, and keep the ones you like in your own library.</p>
        <p>
            <a class="button" href="/signup">Sign up</a>
            <a class="button button-muted" href="/login">Log in</a>
        </p>"#;
    layout("Welcome", None, flash, content)
}

pub fn render_signup(form: &SignupForm, errors: &[FieldError], flash: Option<Flash>) -> String {
    let content = format!(
        r#"<h1>Sign up</h1>
        <form method="post" action="/signup" class="panel">
            <label for="username">Username</label>
            <input type="text" id="username" name="username" value="{username}">
            {username_error}
            <label for="email">Email</label>
            <input type="email" id="email" name="email" value="{email}">
            {email_error}
            <label for="password">Password</label>
            <input type="password" id="password" name="password">
            {password_error}
            <button type="submit" class="button">Create account</button>
        </form>
        <p class="muted">Already have an account? <a href="/login">Log in</a>.</p>"#,
        username = escape_html(&form.username),
        username_error = field_error(errors, "username"),
        email = escape_html(&form.email),
        email_error = field_error(errors, "email"),
        password_error = field_error(errors, "password"),
    );
    layout("Sign up", None, flash, &content)
}

pub fn render_login(form: &LoginForm, errors: &[FieldError], flash: Option<Flash>) -> String {
    let content = format!(
        r#"<h1>Log in</h1>
        <form method="post" action="/login" class="panel">
            <label for="username">Username</label>
            <input type="text" id="username" name="username" value="{username}">
            {username_error}
            <label for="password">Password</label>
            <input type="password" id="password" name="password">
            {password_error}
            <button type="submit" class="button">Log in</button>
        </form>
        <p class="muted">New here? <a href="/signup">Sign up</a>.</p>"#,
        username = escape_html(&form.username),
        username_error = field_error(errors, "username"),
        password_error = field_error(errors, "password"),
    );
    layout("Log in", None, flash, &content)
}

/// Public profile page. The owner additionally sees library controls and
/// account management.
pub fn render_profile(
    viewer: Option<&User>,
    user: &User,
    tracks: &[Track],
    flash: Option<Flash>,
) -> String {
    let own_profile = viewer.map(|v| v.id) == Some(user.id);
    let action = if own_profile {
        TrackAction::Unfollow
    } else {
        TrackAction::None
    };

    let joined = user.created_at.split('T').next().unwrap_or("");
    let subtitle = if own_profile {
        format!("{} &middot; joined {}", escape_html(&user.email), joined)
    } else {
        format!("joined {}", joined)
    };

    let manage = if own_profile {
        r#"<p>
            <a class="button button-muted" href="/users/profile">Edit profile</a>
        </p>
        <form method="post" action="/users/delete" class="inline-form"
              onsubmit="return confirm('Delete your account? This cannot be undone.');">
            <button type="submit" class="button button-danger">Delete account</button>
        </form>"#
    } else {
        ""
    };

    let content = format!(
        r#"<h1>{username}</h1>
        <p class="muted">{subtitle}</p>
        {manage}
        <h2>Library</h2>
        {table}"#,
        username = escape_html(&user.username),
        subtitle = subtitle,
        manage = manage,
        table = track_table(tracks, action),
    );
    layout(&user.username, viewer, flash, &content)
}

pub fn render_profile_edit(
    user: &User,
    form: &ProfileForm,
    errors: &[FieldError],
    flash: Option<Flash>,
) -> String {
    let content = format!(
        r#"<h1>Edit profile</h1>
        <form method="post" action="/users/profile" class="panel">
            <label for="username">Username</label>
            <input type="text" id="username" name="username" value="{username}">
            {username_error}
            <label for="email">Email</label>
            <input type="email" id="email" name="email" value="{email}">
            {email_error}
            <label for="password">Current password</label>
            <input type="password" id="password" name="password">
            {password_error}
            <p class="muted">Enter your current password to confirm the change.</p>
            <button type="submit" class="button">Save changes</button>
        </form>"#,
        username = escape_html(&form.username),
        username_error = field_error(errors, "username"),
        email = escape_html(&form.email),
        email_error = field_error(errors, "email"),
        password_error = field_error(errors, "password"),
    );
    layout("Edit profile", Some(user), flash, &content)
}

pub fn render_tracks(viewer: Option<&User>, tracks: &[Track], query: Option<&str>) -> String {
    let query = query.unwrap_or("");
    let heading = if query.trim().is_empty() {
        "<h1>Tracks</h1>".to_string()
    } else {
        format!(
            r#"<h1>Tracks matching "{}"</h1>"#,
            escape_html(query.trim())
        )
    };

    let content = format!(
        r#"{heading}
        <form method="get" action="/tracks" class="search-form">
            <input type="text" name="q" value="{query}" placeholder="Filter by name">
            <button type="submit" class="button">Filter</button>
        </form>
        {table}"#,
        heading = heading,
        query = escape_html(query),
        table = track_table(tracks, TrackAction::None),
    );
    layout("Tracks", viewer, None, &content)
}

pub fn render_track_detail(viewer: Option<&User>, track: &Track, is_following: bool) -> String {
    let action = match viewer {
        Some(_) if is_following => format!(
            r#"<form method="post" action="/users/stop-following/{id}" class="inline-form">
                <button type="submit" class="button button-muted">Remove from library</button>
            </form>"#,
            id = track.id
        ),
        Some(_) => format!(
            r#"<form method="post" action="/users/follow/{id}" class="inline-form">
                <button type="submit" class="button">Follow</button>
            </form>"#,
            id = track.id
        ),
        None => r#"<p class="muted"><a href="/login">Log in</a> to save this track.</p>"#
            .to_string(),
    };

    let content = format!(
        r#"<h1>{name}</h1>
        <p class="muted">{artist} &middot; {album}</p>
        {action}
        <h2>Audio features</h2>
        <table class="feature-table">{rows}</table>"#,
        name = escape_html(&track.name),
        artist = escape_html(&track.artist),
        album = escape_html(&track.album),
        action = action,
        rows = feature_rows(track),
    );
    layout(&track.name, viewer, None, &content)
}

/// Search page. `outcome` is absent before the first query and after a
/// catalog failure; `notice` carries the user-visible failure text.
pub fn render_search(
    viewer: Option<&User>,
    query: &str,
    outcome: Option<&SearchOutcome>,
    notice: Option<&str>,
) -> String {
    let notice_html = notice
        .map(|text| format!(r#"<div class="flash flash-danger">{}</div>"#, escape_html(text)))
        .unwrap_or_default();

    let results = match outcome {
        Some(outcome) => {
            let action = if viewer.is_some() {
                TrackAction::Follow
            } else {
                TrackAction::None
            };
            let skipped = if outcome.failed_lookups > 0 {
                format!(
                    r#"<p class="muted">{} result(s) could not be loaded from the catalog.</p>"#,
                    outcome.failed_lookups
                )
            } else {
                String::new()
            };
            format!(
                "<h2>Results</h2>{}{}",
                track_table(&outcome.tracks, action),
                skipped
            )
        }
        None => String::new(),
    };

    let content = format!(
        r#"<h1>Search the catalog</h1>
        <form method="get" action="/search" class="search-form">
            <input type="text" name="q" value="{query}" placeholder="Song or artist name">
            <button type="submit" class="button">Search</button>
        </form>
        {notice}
        {results}"#,
        query = escape_html(query),
        notice = notice_html,
        results = results,
    );
    layout("Search", viewer, None, &content)
}

/// Dedicated 404 page, shared by the router fallback and typed not-found
/// errors
pub fn render_not_found(viewer: Option<&User>) -> String {
    let content = r#"<h1>404</h1>
        <p>That page does not exist.</p>
        <p><a class="button" href="/">Back to home</a></p>"#;
    layout("Not found", viewer, None, content)
}

/// Minimal full page for faults that escape a handler
pub fn render_error_page(message: &str) -> String {
    let content = format!(
        r#"<h1>Sorry</h1>
        <p>{}</p>
        <p><a class="button" href="/">Back to home</a></p>"#,
        escape_html(message)
    );
    layout("Error", None, None, &content)
}

fn field_error(errors: &[FieldError], field: &str) -> String {
    errors
        .iter()
        .find(|e| e.field == field)
        .map(|e| format!(r#"<p class="field-error">{}</p>"#, e.message))
        .unwrap_or_default()
}

/// GET /
///
/// Logged-in variant shows the viewer's library; the anonymous variant is a
/// welcome page.
pub async fn home(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(params): Query<FlashParams>,
) -> AppResult<Html<String>> {
    let flash = Flash::from_query(params.flash.as_deref());
    match ctx.user.as_ref() {
        Some(user) => {
            let tracks = db::follows::tracks_for_user(&state.db, user.id).await?;
            Ok(Html(render_home_user(user, &tracks, flash)))
        }
        None => Ok(Html(render_home_anon(flash))),
    }
}

/// GET /categories
///
/// Static explanation of the audio-feature attributes.
pub async fn categories(Extension(ctx): Extension<RequestContext>) -> Html<String> {
    Html(layout(
        "Audio feature categories",
        ctx.user.as_ref(),
        None,
        include_str!("../ui/categories.html"),
    ))
}

/// Router fallback: any unknown path gets the dedicated 404 page
pub async fn not_found(Extension(ctx): Extension<RequestContext>) -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html(render_not_found(ctx.user.as_ref())))
}

/// Home page and static informational pages
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/categories", get(categories))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AudioFeatures;

    fn sample_user() -> User {
        User {
            id: 7,
            username: "daniel".to_string(),
            email: "daniel@example.com".to_string(),
            password_hash: "$2b$12$abcdefghijklmnopqrstuv".to_string(),
            created_at: "2026-08-01T12:00:00+00:00".to_string(),
        }
    }

    fn sample_track(name: &str) -> Track {
        Track {
            id: 3,
            catalog_id: "cat3".to_string(),
            name: name.to_string(),
            artist: "Artist".to_string(),
            album: "Album".to_string(),
            features: AudioFeatures {
                acousticness: 0.1,
                danceability: 0.5,
                duration_ms: 200_000,
                energy: 0.7,
                instrumentalness: 0.0,
                key: 7,
                liveness: 0.2,
                loudness: -7.5,
                mode: 0,
                speechiness: 0.05,
                tempo: 120.0,
                time_signature: 4,
                valence: 0.6,
            },
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Bob" & Carl's</b>"#),
            "&lt;b&gt;&quot;Bob&quot; &amp; Carl&#39;s&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain text"), "plain text");
    }

    #[test]
    fn test_flash_codes_round_trip() {
        let all = [
            Flash::SignedUp,
            Flash::LoggedIn,
            Flash::LoggedOut,
            Flash::InvalidCredentials,
            Flash::Unauthorized,
            Flash::AccountDeleted,
            Flash::ProfileUpdated,
        ];
        for flash in all {
            assert_eq!(Flash::from_code(flash.code()), Some(flash));
        }
        assert_eq!(Flash::from_code("nonsense"), None);
        assert_eq!(Flash::from_query(None), None);
    }

    #[test]
    fn test_layout_nav_varies_with_login_state() {
        let user = sample_user();

        let logged_in = layout("T", Some(&user), None, "");
        assert!(logged_in.contains("Log out"));
        assert!(logged_in.contains("/users/7"));
        assert!(!logged_in.contains(">Sign up<"));

        let anonymous = layout("T", None, None, "");
        assert!(anonymous.contains("Sign up"));
        assert!(!anonymous.contains("Log out"));
    }

    #[test]
    fn test_track_names_are_escaped_in_tables() {
        let track = sample_track("<script>alert(1)</script>");
        let page = render_tracks(None, &[track], None);
        assert!(page.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!page.contains("<script>alert(1)"));
    }

    #[test]
    fn test_track_detail_shows_features_and_follow_state() {
        let user = sample_user();
        let track = sample_track("Sample");

        let can_follow = render_track_detail(Some(&user), &track, false);
        assert!(can_follow.contains("/users/follow/3"));
        assert!(can_follow.contains("G minor"));
        assert!(can_follow.contains("120.0 BPM"));

        let following = render_track_detail(Some(&user), &track, true);
        assert!(following.contains("/users/stop-following/3"));

        let anonymous = render_track_detail(None, &track, false);
        assert!(anonymous.contains("Log in"));
        assert!(!anonymous.contains("/users/follow/3"));
    }

    #[test]
    fn test_search_page_notes_failed_lookups() {
        let outcome = SearchOutcome {
            tracks: vec![sample_track("Kept")],
            failed_lookups: 2,
        };
        let page = render_search(None, "mango", Some(&outcome), None);
        assert!(page.contains("Results"));
        assert!(page.contains("2 result(s) could not be loaded"));

        let clean = SearchOutcome {
            tracks: vec![sample_track("Kept")],
            failed_lookups: 0,
        };
        let page = render_search(None, "mango", Some(&clean), None);
        assert!(!page.contains("could not be loaded"));
    }

    #[test]
    fn test_not_found_page() {
        let page = render_not_found(None);
        assert!(page.contains("404"));
        assert!(page.contains("does not exist"));
    }

    #[test]
    fn test_signup_renders_field_errors_and_keeps_input() {
        let form = SignupForm {
            username: "dan".to_string(),
            email: "bad".to_string(),
            password: "short".to_string(),
        };
        let errors = form.validate();
        let page = render_signup(&form, &errors, None);
        assert!(page.contains(r#"value="dan""#));
        assert!(page.contains("Email does not look valid"));
        assert!(page.contains("at least 8 characters"));
    }
}
