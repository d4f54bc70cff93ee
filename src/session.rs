//! Session identity tokens and cookie plumbing
//!
//! A logged-in browser holds a `session` cookie containing a signed token
//! whose subject is the user id. Tokens are signed with the configured
//! session secret and expire after seven days; the cookie itself is a
//! browser-session cookie.
//!
//! This module contains only pure functions. The middleware and handler
//! glue that reads and sets cookies lives in the api layer.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cookie name carrying the session token
pub const SESSION_COOKIE: &str = "session";

const SESSION_TTL_DAYS: i64 = 7;

/// Session token error types
#[derive(Debug, Error)]
pub enum SessionError {
    /// Signing, decoding, or expiry failure from the token library
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Token decoded but its subject is not a user id
    #[error("token subject is not a user id")]
    InvalidSubject,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User id as a decimal string
    sub: String,
    /// Expiry as Unix seconds
    exp: usize,
}

/// Issue a signed session token for a user
pub fn issue_token(user_id: i64, secret: &str) -> Result<String, SessionError> {
    issue_token_with_ttl(user_id, secret, chrono::Duration::days(SESSION_TTL_DAYS))
}

fn issue_token_with_ttl(
    user_id: i64,
    secret: &str,
    ttl: chrono::Duration,
) -> Result<String, SessionError> {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (Utc::now() + ttl).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verify a session token and return the user id it names
///
/// Fails on bad signature, expiry, or a malformed subject.
pub fn verify_token(token: &str, secret: &str) -> Result<i64, SessionError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;

    data.claims
        .sub
        .parse::<i64>()
        .map_err(|_| SessionError::InvalidSubject)
}

/// Set-Cookie value installing a session token
pub fn session_cookie(token: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, token)
}

/// Set-Cookie value clearing the session
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Pull the session token out of a raw Cookie header value
pub fn token_from_cookie_header(header: &str) -> Option<&str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_token_round_trip() {
        let token = issue_token(42, SECRET).unwrap();
        let user_id = verify_token(&token, SECRET).unwrap();
        assert_eq!(user_id, 42);
    }

    #[test]
    fn test_token_rejected_with_wrong_secret() {
        let token = issue_token(42, SECRET).unwrap();
        assert!(verify_token(&token, "other-secret").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Two days past expiry, well beyond validation leeway
        let token =
            issue_token_with_ttl(42, SECRET, chrono::Duration::days(-2)).unwrap();
        assert!(verify_token(&token, SECRET).is_err());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let token = issue_token(42, SECRET).unwrap();
        let mut tampered = token.clone();
        tampered.pop();
        tampered.push('x');
        assert!(verify_token(&tampered, SECRET).is_err());
    }

    #[test]
    fn test_token_from_cookie_header() {
        assert_eq!(token_from_cookie_header("session=abc123"), Some("abc123"));
        assert_eq!(
            token_from_cookie_header("theme=dark; session=abc123; lang=en"),
            Some("abc123")
        );
        assert_eq!(
            token_from_cookie_header("theme=dark;  session=abc123"),
            Some("abc123")
        );
        assert_eq!(token_from_cookie_header("theme=dark"), None);
        assert_eq!(token_from_cookie_header("session="), None);
        assert_eq!(token_from_cookie_header(""), None);
    }

    #[test]
    fn test_cookie_strings() {
        let cookie = session_cookie("tok");
        assert!(cookie.starts_with("session=tok"));
        assert!(cookie.contains("HttpOnly"));

        let clear = clear_session_cookie();
        assert!(clear.contains("Max-Age=0"));
    }
}
