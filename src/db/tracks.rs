//! Track storage operations
//!
//! Tracks are written once at ingestion time and never updated. Listing is
//! capped and name-ordered; the substring search matches case-insensitively
//! and treats LIKE wildcards in the query as literals.

use sqlx::{Row, SqlitePool};

use crate::error::{AppError, AppResult};
use crate::models::{AudioFeatures, NewTrack, Track};

/// Cap applied to both the plain listing and the searched listing
const LISTING_CAP: i64 = 100;

/// Insert a newly ingested track
pub async fn insert_track(pool: &SqlitePool, new: &NewTrack) -> AppResult<Track> {
    let done = sqlx::query(
        r#"
        INSERT INTO tracks (
            catalog_id, name, artist, album,
            acousticness, danceability, duration_ms, energy, instrumentalness,
            key, liveness, loudness, mode, speechiness, tempo, time_signature, valence
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&new.catalog_id)
    .bind(&new.name)
    .bind(&new.artist)
    .bind(&new.album)
    .bind(new.features.acousticness)
    .bind(new.features.danceability)
    .bind(new.features.duration_ms)
    .bind(new.features.energy)
    .bind(new.features.instrumentalness)
    .bind(new.features.key)
    .bind(new.features.liveness)
    .bind(new.features.loudness)
    .bind(new.features.mode)
    .bind(new.features.speechiness)
    .bind(new.features.tempo)
    .bind(new.features.time_signature)
    .bind(new.features.valence)
    .execute(pool)
    .await?;

    Ok(Track {
        id: done.last_insert_rowid(),
        catalog_id: new.catalog_id.clone(),
        name: new.name.clone(),
        artist: new.artist.clone(),
        album: new.album.clone(),
        features: new.features.clone(),
    })
}

/// Look up a track by primary key
pub async fn get_track(pool: &SqlitePool, track_id: i64) -> AppResult<Option<Track>> {
    let row = sqlx::query("SELECT * FROM tracks WHERE id = ?")
        .bind(track_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| track_from_row(&r)))
}

/// As [`get_track`] but a missing row is the typed not-found
pub async fn get_track_or_404(pool: &SqlitePool, track_id: i64) -> AppResult<Track> {
    get_track(pool, track_id).await?.ok_or(AppError::NotFound)
}

/// Find the local track for an external catalog id. Duplicate rows can
/// exist for one id; the oldest wins.
pub async fn find_by_catalog_id(
    pool: &SqlitePool,
    catalog_id: &str,
) -> AppResult<Option<Track>> {
    let row = sqlx::query(
        r#"
        SELECT * FROM tracks
        WHERE catalog_id = ?
        ORDER BY id ASC
        LIMIT 1
        "#,
    )
    .bind(catalog_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| track_from_row(&r)))
}

/// List tracks, name-ordered. No query: the full listing, capped. With a
/// query: case-insensitive substring match on name, same cap.
pub async fn list_tracks(pool: &SqlitePool, query: Option<&str>) -> AppResult<Vec<Track>> {
    let rows = match query.map(str::trim).filter(|q| !q.is_empty()) {
        None => {
            sqlx::query(
                r#"
                SELECT * FROM tracks
                ORDER BY name COLLATE NOCASE ASC
                LIMIT ?
                "#,
            )
            .bind(LISTING_CAP)
            .fetch_all(pool)
            .await?
        }
        Some(q) => {
            let pattern = format!("%{}%", escape_like(q));
            sqlx::query(
                r#"
                SELECT * FROM tracks
                WHERE name LIKE ? ESCAPE '\'
                ORDER BY name COLLATE NOCASE ASC
                LIMIT ?
                "#,
            )
            .bind(pattern)
            .bind(LISTING_CAP)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows.iter().map(track_from_row).collect())
}

/// Remove a track row. Join rows go with it via cascade; users stay.
/// No HTTP route reaches this; it exists for storage-layer maintenance.
pub async fn delete_track(pool: &SqlitePool, track_id: i64) -> AppResult<()> {
    sqlx::query("DELETE FROM tracks WHERE id = ?")
        .bind(track_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Make LIKE wildcards in user input match literally
fn escape_like(query: &str) -> String {
    query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

pub(crate) fn track_from_row(row: &sqlx::sqlite::SqliteRow) -> Track {
    Track {
        id: row.get("id"),
        catalog_id: row.get("catalog_id"),
        name: row.get("name"),
        artist: row.get("artist"),
        album: row.get("album"),
        features: AudioFeatures {
            acousticness: row.get("acousticness"),
            danceability: row.get("danceability"),
            duration_ms: row.get("duration_ms"),
            energy: row.get("energy"),
            instrumentalness: row.get("instrumentalness"),
            key: row.get("key"),
            liveness: row.get("liveness"),
            loudness: row.get("loudness"),
            mode: row.get("mode"),
            speechiness: row.get("speechiness"),
            tempo: row.get("tempo"),
            time_signature: row.get("time_signature"),
            valence: row.get("valence"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{memory_pool, sample_new_track};

    #[tokio::test]
    async fn test_insert_and_get_round_trip() {
        let pool = memory_pool().await;

        let inserted = insert_track(&pool, &sample_new_track("Mango", "cat-1"))
            .await
            .unwrap();
        let fetched = get_track(&pool, inserted.id).await.unwrap().unwrap();

        assert_eq!(fetched.name, "Mango");
        assert_eq!(fetched.catalog_id, "cat-1");
        assert_eq!(fetched.features, inserted.features);
    }

    #[tokio::test]
    async fn test_get_track_or_404() {
        let pool = memory_pool().await;

        let err = get_track_or_404(&pool, 12345).await.unwrap_err();
        assert!(matches!(err, crate::error::AppError::NotFound));
    }

    #[tokio::test]
    async fn test_find_by_catalog_id_oldest_wins() {
        let pool = memory_pool().await;

        let first = insert_track(&pool, &sample_new_track("Mango", "dup-id"))
            .await
            .unwrap();
        insert_track(&pool, &sample_new_track("Mango (reissue)", "dup-id"))
            .await
            .unwrap();

        let found = find_by_catalog_id(&pool, "dup-id").await.unwrap().unwrap();
        assert_eq!(found.id, first.id);

        assert!(find_by_catalog_id(&pool, "missing-id")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_listing_ordered_by_name() {
        let pool = memory_pool().await;

        for name in ["Zebra", "Apple", "Mango"] {
            insert_track(&pool, &sample_new_track(name, name)).await.unwrap();
        }

        let tracks = list_tracks(&pool, None).await.unwrap();
        let names: Vec<&str> = tracks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Apple", "Mango", "Zebra"]);
    }

    #[tokio::test]
    async fn test_listing_orders_case_insensitively() {
        let pool = memory_pool().await;

        for name in ["banana", "Apple", "cherry"] {
            insert_track(&pool, &sample_new_track(name, name)).await.unwrap();
        }

        let tracks = list_tracks(&pool, None).await.unwrap();
        let names: Vec<&str> = tracks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Apple", "banana", "cherry"]);
    }

    #[tokio::test]
    async fn test_listing_capped_at_one_hundred() {
        let pool = memory_pool().await;

        for i in 0..105 {
            insert_track(&pool, &sample_new_track(&format!("Track {:03}", i), &format!("cat-{}", i)))
                .await
                .unwrap();
        }

        let unqueried = list_tracks(&pool, None).await.unwrap();
        assert_eq!(unqueried.len(), 100);

        let queried = list_tracks(&pool, Some("Track")).await.unwrap();
        assert_eq!(queried.len(), 100);
    }

    #[tokio::test]
    async fn test_search_matches_substring_case_insensitively() {
        let pool = memory_pool().await;

        for name in ["Mango", "Banana", "Zebra"] {
            insert_track(&pool, &sample_new_track(name, name)).await.unwrap();
        }

        let lower = list_tracks(&pool, Some("an")).await.unwrap();
        let names: Vec<&str> = lower.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Banana", "Mango"]);

        let upper = list_tracks(&pool, Some("AN")).await.unwrap();
        assert_eq!(upper.len(), 2);
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let pool = memory_pool().await;

        insert_track(&pool, &sample_new_track("100% Pure", "pct")).await.unwrap();
        insert_track(&pool, &sample_new_track("Underscore_Song", "und")).await.unwrap();
        insert_track(&pool, &sample_new_track("Plain", "pln")).await.unwrap();

        // '%' must not act as match-anything
        let percent = list_tracks(&pool, Some("%")).await.unwrap();
        let names: Vec<&str> = percent.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["100% Pure"]);

        // '_' must not act as match-one
        let underscore = list_tracks(&pool, Some("_")).await.unwrap();
        let names: Vec<&str> = underscore.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Underscore_Song"]);
    }

    #[tokio::test]
    async fn test_blank_query_is_the_plain_listing() {
        let pool = memory_pool().await;

        insert_track(&pool, &sample_new_track("Mango", "m")).await.unwrap();

        let blank = list_tracks(&pool, Some("   ")).await.unwrap();
        assert_eq!(blank.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_track() {
        let pool = memory_pool().await;

        let track = insert_track(&pool, &sample_new_track("Mango", "m")).await.unwrap();
        delete_track(&pool, track.id).await.unwrap();

        assert!(get_track(&pool, track.id).await.unwrap().is_none());
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }
}
