//! User storage operations
//!
//! Passwords are bcrypt-hashed before they reach this module's INSERT and
//! never stored in plaintext. Uniqueness of username and email is enforced
//! by the schema; a violation surfaces as the typed
//! [`AppError::UsernameTaken`] so handlers can re-present the form.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::error::{AppError, AppResult};
use crate::models::User;

/// Create a new account with a freshly hashed password
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password: &str,
) -> AppResult<User> {
    let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
    let created_at = Utc::now().to_rfc3339();

    let result = sqlx::query(
        r#"
        INSERT INTO users (username, email, password_hash, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(&password_hash)
    .bind(&created_at)
    .execute(pool)
    .await;

    match result {
        Ok(done) => Ok(User {
            id: done.last_insert_rowid(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            created_at,
        }),
        Err(e) => Err(map_unique_violation(e)),
    }
}

/// Verify credentials. `Ok(None)` covers both unknown username and wrong
/// password; `Err` is reserved for storage faults.
pub async fn authenticate(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> AppResult<Option<User>> {
    let user = match get_by_username(pool, username).await? {
        Some(user) => user,
        None => return Ok(None),
    };

    if bcrypt::verify(password, &user.password_hash).unwrap_or(false) {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}

/// Look up a user by primary key
pub async fn get_user(pool: &SqlitePool, user_id: i64) -> AppResult<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT id, username, email, password_hash, created_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| user_from_row(&r)))
}

async fn get_by_username(pool: &SqlitePool, username: &str) -> AppResult<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT id, username, email, password_hash, created_at
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| user_from_row(&r)))
}

/// Update username/email on an existing account. The password re-check
/// happens in the handler before this is called.
pub async fn update_profile(
    pool: &SqlitePool,
    user_id: i64,
    username: &str,
    email: &str,
) -> AppResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET username = ?, email = ?
        WHERE id = ?
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(user_id)
    .execute(pool)
    .await;

    match result {
        Ok(done) if done.rows_affected() == 0 => Err(AppError::NotFound),
        Ok(_) => Ok(()),
        Err(e) => Err(map_unique_violation(e)),
    }
}

/// Delete an account. Join rows go with it via cascade; tracks stay.
pub async fn delete_user(pool: &SqlitePool, user_id: i64) -> AppResult<()> {
    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

fn map_unique_violation(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::UsernameTaken
        }
        other => other.into(),
    }
}

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;

    #[tokio::test]
    async fn test_create_user_hashes_password() {
        let pool = memory_pool().await;

        let user = create_user(&pool, "daniel", "daniel@example.com", "hunter22yes")
            .await
            .unwrap();

        assert_eq!(user.username, "daniel");
        assert_ne!(user.password_hash, "hunter22yes");
        assert!(user.password_hash.starts_with("$2"));

        let fetched = get_user(&pool, user.id).await.unwrap().unwrap();
        assert_eq!(fetched.email, "daniel@example.com");
        assert_eq!(fetched.password_hash, user.password_hash);
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let pool = memory_pool().await;

        create_user(&pool, "daniel", "one@example.com", "hunter22yes")
            .await
            .unwrap();
        let err = create_user(&pool, "daniel", "two@example.com", "hunter22yes")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UsernameTaken));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let pool = memory_pool().await;

        create_user(&pool, "daniel", "same@example.com", "hunter22yes")
            .await
            .unwrap();
        let err = create_user(&pool, "other", "same@example.com", "hunter22yes")
            .await
            .unwrap_err();

        // Deliberately the same outcome as a username collision; the form
        // never learns which field collided
        assert!(matches!(err, AppError::UsernameTaken));
    }

    #[tokio::test]
    async fn test_authenticate_sentinel_semantics() {
        let pool = memory_pool().await;

        let user = create_user(&pool, "daniel", "daniel@example.com", "hunter22yes")
            .await
            .unwrap();

        let ok = authenticate(&pool, "daniel", "hunter22yes").await.unwrap();
        assert_eq!(ok.map(|u| u.id), Some(user.id));

        let wrong_password = authenticate(&pool, "daniel", "wrong-password").await.unwrap();
        assert!(wrong_password.is_none());

        let unknown_user = authenticate(&pool, "nobody", "hunter22yes").await.unwrap();
        assert!(unknown_user.is_none());
    }

    #[tokio::test]
    async fn test_update_profile() {
        let pool = memory_pool().await;

        let user = create_user(&pool, "daniel", "daniel@example.com", "hunter22yes")
            .await
            .unwrap();

        update_profile(&pool, user.id, "danielk", "dk@example.com")
            .await
            .unwrap();

        let updated = get_user(&pool, user.id).await.unwrap().unwrap();
        assert_eq!(updated.username, "danielk");
        assert_eq!(updated.email, "dk@example.com");
    }

    #[tokio::test]
    async fn test_update_profile_collision_rejected() {
        let pool = memory_pool().await;

        create_user(&pool, "taken", "taken@example.com", "hunter22yes")
            .await
            .unwrap();
        let user = create_user(&pool, "daniel", "daniel@example.com", "hunter22yes")
            .await
            .unwrap();

        let err = update_profile(&pool, user.id, "taken", "daniel@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UsernameTaken));
    }

    #[tokio::test]
    async fn test_update_profile_missing_user() {
        let pool = memory_pool().await;

        let err = update_profile(&pool, 999, "ghost", "ghost@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_user() {
        let pool = memory_pool().await;

        let user = create_user(&pool, "daniel", "daniel@example.com", "hunter22yes")
            .await
            .unwrap();

        delete_user(&pool, user.id).await.unwrap();

        assert!(get_user(&pool, user.id).await.unwrap().is_none());
        assert!(authenticate(&pool, "daniel", "hunter22yes")
            .await
            .unwrap()
            .is_none());

        // Deleting again is a quiet no-op
        delete_user(&pool, user.id).await.unwrap();
    }
}
