//! Database access for tracknest
//!
//! SQLite via sqlx. Three tables: users, tracks, and the user_tracks join.
//! Tables are created idempotently at pool init, and foreign keys are
//! enforced on every connection so join rows follow their parents.

pub mod follows;
pub mod tracks;
pub mod users;

use anyhow::Result;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use std::str::FromStr;

/// Initialize the database connection pool and create tables
pub async fn init_database_pool(database_url: &str) -> Result<SqlitePool> {
    tracing::debug!("Connecting to database: {}", database_url);

    let options = SqliteConnectOptions::from_str(database_url)?.foreign_keys(true);
    let pool = SqlitePool::connect_with(options).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // catalog_id deliberately carries no UNIQUE constraint; duplicate rows
    // for the same external track can exist at the storage layer
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tracks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            catalog_id TEXT NOT NULL,
            name TEXT NOT NULL,
            artist TEXT NOT NULL,
            album TEXT NOT NULL,
            acousticness REAL NOT NULL,
            danceability REAL NOT NULL,
            duration_ms INTEGER NOT NULL,
            energy REAL NOT NULL,
            instrumentalness REAL NOT NULL,
            key INTEGER NOT NULL,
            liveness REAL NOT NULL,
            loudness REAL NOT NULL,
            mode INTEGER NOT NULL,
            speechiness REAL NOT NULL,
            tempo REAL NOT NULL,
            time_signature INTEGER NOT NULL,
            valence REAL NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Each cascade removes join rows only, never the other parent
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_tracks (
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            track_id INTEGER NOT NULL REFERENCES tracks(id) ON DELETE CASCADE,
            PRIMARY KEY (user_id, track_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (users, tracks, user_tracks)");

    Ok(())
}

/// Single-connection in-memory pool for unit tests. One connection only:
/// each additional in-memory connection would get its own empty database.
#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    use sqlx::sqlite::SqlitePoolOptions;

    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();

    init_tables(&pool).await.unwrap();

    pool
}

#[cfg(test)]
pub(crate) fn sample_new_track(name: &str, catalog_id: &str) -> crate::models::NewTrack {
    crate::models::NewTrack {
        catalog_id: catalog_id.to_string(),
        name: name.to_string(),
        artist: "Test Artist".to_string(),
        album: "Test Album".to_string(),
        features: crate::models::AudioFeatures {
            acousticness: 0.12,
            danceability: 0.55,
            duration_ms: 201_000,
            energy: 0.8,
            instrumentalness: 0.01,
            key: 5,
            liveness: 0.3,
            loudness: -6.2,
            mode: 1,
            speechiness: 0.04,
            tempo: 128.0,
            time_signature: 4,
            valence: 0.71,
        },
    }
}
