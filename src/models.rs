//! Domain types shared across the storage, service, and handler layers

use serde::Deserialize;

/// A registered account
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// bcrypt hash, never the plaintext
    pub password_hash: String,
    /// RFC 3339 creation timestamp
    pub created_at: String,
}

/// A locally stored track with its cached audio features
#[derive(Debug, Clone)]
pub struct Track {
    pub id: i64,
    /// External catalog identifier. Not unique at the storage layer.
    pub catalog_id: String,
    pub name: String,
    /// First listed artist only
    pub artist: String,
    pub album: String,
    pub features: AudioFeatures,
}

/// A track assembled from catalog payloads, ready for insertion
#[derive(Debug, Clone)]
pub struct NewTrack {
    pub catalog_id: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub features: AudioFeatures,
}

/// The fixed numeric attribute set describing a track, fetched once per
/// external id and cached locally. Field names match the catalog wire format,
/// so this doubles as the deserialization target for the features endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AudioFeatures {
    pub acousticness: f64,
    pub danceability: f64,
    pub duration_ms: i64,
    pub energy: f64,
    pub instrumentalness: f64,
    /// Pitch class 0-11, -1 when undetected
    pub key: i64,
    pub liveness: f64,
    pub loudness: f64,
    /// 1 = major, 0 = minor
    pub mode: i64,
    pub speechiness: f64,
    pub tempo: f64,
    pub time_signature: i64,
    pub valence: f64,
}

impl Track {
    /// Duration as m:ss for display
    pub fn duration_display(&self) -> String {
        let total_secs = self.features.duration_ms / 1000;
        format!("{}:{:02}", total_secs / 60, total_secs % 60)
    }

    /// Key and mode as conventional notation, e.g. "G minor"
    pub fn key_display(&self) -> String {
        const PITCH_CLASSES: [&str; 12] = [
            "C", "C♯/D♭", "D", "D♯/E♭", "E", "F", "F♯/G♭", "G", "G♯/A♭", "A", "A♯/B♭", "B",
        ];

        let pitch = match usize::try_from(self.features.key) {
            Ok(k) if k < 12 => PITCH_CLASSES[k],
            _ => return "unknown".to_string(),
        };
        let mode = if self.features.mode == 1 { "major" } else { "minor" };

        format!("{} {}", pitch, mode)
    }
}
