use sqlx::{Row, SqlitePool};

use shared::types::UserAuth;

use super::utils::get_timestamp;

/// Get user authentication data by username
pub async fn get_user_auth(pool: &SqlitePool, username: &str) -> sqlx::Result<Option<UserAuth>> {
    let row = sqlx::query("SELECT id, username, password_hash FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| UserAuth {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
    }))
}

/// Check whether a username is already registered
pub async fn username_exists(pool: &SqlitePool, username: &str) -> sqlx::Result<bool> {
    let row = sqlx::query("SELECT 1 FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

/// Insert a new activated user and return its row id
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    password_hash: &str,
) -> sqlx::Result<i64> {
    let result = sqlx::query(
        "INSERT INTO users (username, password_hash, created_at)
         VALUES (?, ?, ?)",
    )
    .bind(username)
    .bind(password_hash)
    .bind(get_timestamp())
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Update last login timestamp
pub async fn update_last_login(pool: &SqlitePool, user_id: i64) -> sqlx::Result<()> {
    sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
        .bind(get_timestamp())
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}
