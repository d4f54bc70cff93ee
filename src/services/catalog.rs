//! External catalog API client
//!
//! Spotify-shaped surface: a client-credentials token exchange, a search
//! endpoint, and an audio-features endpoint keyed by track id. Credentials
//! come from the client's own ambient mechanism (the SPOTIFY_CLIENT_ID and
//! SPOTIFY_CLIENT_SECRET environment variables), not from application
//! config. The bearer token is fetched lazily and cached until shortly
//! before its reported expiry. Calls share one HTTP client with a finite
//! timeout; there are no retries.

use serde::Deserialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::AudioFeatures;

const CATALOG_BASE_URL: &str = "https://api.spotify.com/v1";
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const USER_AGENT: &str = "tracknest/0.1.0";
const REQUEST_TIMEOUT_SECS: u64 = 10;
/// Fixed result count requested from the search endpoint
const SEARCH_LIMIT: &str = "5";
/// Refresh the token this long before its reported expiry
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Catalog client errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog credentials not configured")]
    MissingCredentials,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Audio features not found for {0}")]
    FeaturesNotFound(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// One search result, reduced to the fields this system stores
#[derive(Debug, Clone)]
pub struct TrackHit {
    pub catalog_id: String,
    pub name: String,
    /// First listed artist only
    pub artist: String,
    pub album: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: SearchTracks,
}

#[derive(Debug, Deserialize)]
struct SearchTracks {
    items: Vec<TrackItem>,
}

#[derive(Debug, Deserialize)]
struct TrackItem {
    id: String,
    name: String,
    artists: Vec<ArtistRef>,
    album: AlbumRef,
}

#[derive(Debug, Deserialize)]
struct ArtistRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AlbumRef {
    name: String,
}

impl From<TrackItem> for TrackHit {
    fn from(item: TrackItem) -> Self {
        let artist = item
            .artists
            .into_iter()
            .next()
            .map(|a| a.name)
            .unwrap_or_else(|| "Unknown".to_string());

        Self {
            catalog_id: item.id,
            name: item.name,
            artist,
            album: item.album.name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    value: String,
    acquired: Instant,
    expires_in: Duration,
}

impl CachedToken {
    fn is_usable(&self) -> bool {
        self.acquired.elapsed() + TOKEN_EXPIRY_MARGIN < self.expires_in
    }
}

/// External catalog API client
pub struct CatalogClient {
    http_client: reqwest::Client,
    credentials: Option<(String, String)>,
    token: Mutex<Option<CachedToken>>,
}

impl CatalogClient {
    /// Build a client from the ambient environment credentials
    pub fn from_env() -> Result<Self, CatalogError> {
        let credentials = match (
            std::env::var("SPOTIFY_CLIENT_ID"),
            std::env::var("SPOTIFY_CLIENT_SECRET"),
        ) {
            (Ok(id), Ok(secret)) if !id.is_empty() && !secret.is_empty() => Some((id, secret)),
            _ => None,
        };

        if credentials.is_none() {
            tracing::warn!(
                "SPOTIFY_CLIENT_ID / SPOTIFY_CLIENT_SECRET not set; catalog search unavailable"
            );
        }

        Self::new(credentials)
    }

    pub fn new(credentials: Option<(String, String)>) -> Result<Self, CatalogError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| CatalogError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            credentials,
            token: Mutex::new(None),
        })
    }

    /// Current bearer token, performing the client-credentials exchange
    /// when the cache is empty or stale
    async fn bearer_token(&self) -> Result<String, CatalogError> {
        let (client_id, client_secret) = self
            .credentials
            .as_ref()
            .ok_or(CatalogError::MissingCredentials)?;

        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.is_usable() {
                return Ok(token.value.clone());
            }
        }

        let response = self
            .http_client
            .post(TOKEN_URL)
            .basic_auth(client_id, Some(client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| CatalogError::NetworkError(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::ApiError(status.as_u16(), error_text));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::ParseError(e.to_string()))?;

        tracing::debug!(expires_in = token.expires_in, "Obtained catalog access token");

        let value = token.access_token.clone();
        *cached = Some(CachedToken {
            value: token.access_token,
            acquired: Instant::now(),
            expires_in: Duration::from_secs(token.expires_in),
        });

        Ok(value)
    }

    /// Search the catalog for tracks matching a free-text query
    ///
    /// Requests a fixed result count of five. The query travels as a URL
    /// parameter and is percent-encoded by the HTTP client.
    pub async fn search_tracks(&self, query: &str) -> Result<Vec<TrackHit>, CatalogError> {
        let token = self.bearer_token().await?;

        tracing::debug!(query = %query, "Querying catalog search");

        let response = self
            .http_client
            .get(format!("{}/search", CATALOG_BASE_URL))
            .bearer_auth(&token)
            .query(&[("q", query), ("type", "track"), ("limit", SEARCH_LIMIT)])
            .send()
            .await
            .map_err(|e| CatalogError::NetworkError(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::ApiError(status.as_u16(), error_text));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::ParseError(e.to_string()))?;

        let hits: Vec<TrackHit> = parsed.tracks.items.into_iter().map(TrackHit::from).collect();

        tracing::info!(query = %query, results = hits.len(), "Catalog search returned");

        Ok(hits)
    }

    /// Fetch the audio-feature attributes for one external track id
    pub async fn audio_features(&self, catalog_id: &str) -> Result<AudioFeatures, CatalogError> {
        let token = self.bearer_token().await?;

        tracing::debug!(catalog_id = %catalog_id, "Querying catalog audio features");

        let response = self
            .http_client
            .get(format!("{}/audio-features/{}", CATALOG_BASE_URL, catalog_id))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| CatalogError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status == 404 {
            return Err(CatalogError::FeaturesNotFound(catalog_id.to_string()));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::ApiError(status.as_u16(), error_text));
        }

        let features: AudioFeatures = response
            .json()
            .await
            .map_err(|e| CatalogError::ParseError(e.to_string()))?;

        Ok(features)
    }
}
