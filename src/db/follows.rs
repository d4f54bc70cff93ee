//! User-Track join operations ("this user saved this track")
//!
//! One join row per (user, track) pair, enforced by the composite primary
//! key. Following twice is a no-op, as is unfollowing a track that was
//! never followed.

use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use crate::models::Track;

/// Save a track to a user's library. Re-following is absorbed by the
/// composite key.
pub async fn follow(pool: &SqlitePool, user_id: i64, track_id: i64) -> AppResult<()> {
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO user_tracks (user_id, track_id)
        VALUES (?, ?)
        "#,
    )
    .bind(user_id)
    .bind(track_id)
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(()),
        // A vanished parent row surfaces as the same typed not-found the
        // handlers use
        Err(sqlx::Error::Database(ref db_err)) if db_err.is_foreign_key_violation() => {
            Err(AppError::NotFound)
        }
        Err(e) => Err(e.into()),
    }
}

/// Remove a track from a user's library. Quiet no-op when no join row
/// exists.
pub async fn unfollow(pool: &SqlitePool, user_id: i64, track_id: i64) -> AppResult<()> {
    sqlx::query(
        r#"
        DELETE FROM user_tracks
        WHERE user_id = ? AND track_id = ?
        "#,
    )
    .bind(user_id)
    .bind(track_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Membership test over the join table
pub async fn is_following(pool: &SqlitePool, user_id: i64, track_id: i64) -> AppResult<bool> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM user_tracks
        WHERE user_id = ? AND track_id = ?
        "#,
    )
    .bind(user_id)
    .bind(track_id)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

/// The user's saved tracks, name-ordered for profile rendering
pub async fn tracks_for_user(pool: &SqlitePool, user_id: i64) -> AppResult<Vec<Track>> {
    let rows = sqlx::query(
        r#"
        SELECT t.* FROM tracks t
        JOIN user_tracks ut ON ut.track_id = t.id
        WHERE ut.user_id = ?
        ORDER BY t.name COLLATE NOCASE ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(super::tracks::track_from_row).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{memory_pool, sample_new_track};
    use crate::db::{tracks, users};

    async fn setup_user_and_track(pool: &SqlitePool) -> (i64, i64) {
        let user = users::create_user(pool, "daniel", "daniel@example.com", "hunter22yes")
            .await
            .unwrap();
        let track = tracks::insert_track(pool, &sample_new_track("Mango", "cat-1"))
            .await
            .unwrap();
        (user.id, track.id)
    }

    async fn join_row_count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM user_tracks")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_follow_and_membership() {
        let pool = memory_pool().await;
        let (user_id, track_id) = setup_user_and_track(&pool).await;

        assert!(!is_following(&pool, user_id, track_id).await.unwrap());

        follow(&pool, user_id, track_id).await.unwrap();

        assert!(is_following(&pool, user_id, track_id).await.unwrap());
        let saved = tracks_for_user(&pool, user_id).await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].name, "Mango");
    }

    #[tokio::test]
    async fn test_follow_twice_keeps_one_row() {
        let pool = memory_pool().await;
        let (user_id, track_id) = setup_user_and_track(&pool).await;

        follow(&pool, user_id, track_id).await.unwrap();
        follow(&pool, user_id, track_id).await.unwrap();

        assert_eq!(join_row_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_unfollow_not_followed_is_noop() {
        let pool = memory_pool().await;
        let (user_id, track_id) = setup_user_and_track(&pool).await;

        unfollow(&pool, user_id, track_id).await.unwrap();
        assert_eq!(join_row_count(&pool).await, 0);

        follow(&pool, user_id, track_id).await.unwrap();
        unfollow(&pool, user_id, track_id).await.unwrap();
        assert!(!is_following(&pool, user_id, track_id).await.unwrap());

        // Library unchanged by a second unfollow
        unfollow(&pool, user_id, track_id).await.unwrap();
        assert_eq!(join_row_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_follow_missing_track_is_not_found() {
        let pool = memory_pool().await;
        let (user_id, _) = setup_user_and_track(&pool).await;

        let err = follow(&pool, user_id, 9999).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn test_tracks_for_user_is_name_ordered() {
        let pool = memory_pool().await;
        let (user_id, _) = setup_user_and_track(&pool).await;

        for name in ["Zebra", "Apple"] {
            let track = tracks::insert_track(&pool, &sample_new_track(name, name))
                .await
                .unwrap();
            follow(&pool, user_id, track.id).await.unwrap();
        }

        let saved = tracks_for_user(&pool, user_id).await.unwrap();
        let names: Vec<&str> = saved.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Apple", "Zebra"]);
    }

    #[tokio::test]
    async fn test_deleting_user_removes_joins_not_tracks() {
        let pool = memory_pool().await;
        let (user_id, track_id) = setup_user_and_track(&pool).await;
        follow(&pool, user_id, track_id).await.unwrap();

        users::delete_user(&pool, user_id).await.unwrap();

        assert_eq!(join_row_count(&pool).await, 0);
        // The track row survives the cascade
        assert!(tracks::get_track(&pool, track_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_deleting_track_removes_joins_not_users() {
        let pool = memory_pool().await;
        let (user_id, track_id) = setup_user_and_track(&pool).await;
        follow(&pool, user_id, track_id).await.unwrap();

        tracks::delete_track(&pool, track_id).await.unwrap();

        assert_eq!(join_row_count(&pool).await, 0);
        // The user row survives the cascade
        assert!(users::get_user(&pool, user_id).await.unwrap().is_some());
    }
}
