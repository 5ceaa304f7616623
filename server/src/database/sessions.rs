use sqlx::{Row, SqlitePool};

use shared::types::{NewSession, SessionUser};

use super::utils::get_timestamp;

/// Create a new session
pub async fn create_session(pool: &SqlitePool, new_session: NewSession) -> sqlx::Result<i64> {
    let result = sqlx::query(
        "INSERT INTO sessions (user_id, session_id, created_at, expires_at)
         VALUES (?, ?, ?, ?)",
    )
    .bind(new_session.user_id)
    .bind(&new_session.session_id)
    .bind(get_timestamp())
    .bind(new_session.expires_at)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Resolve a session cookie to its user, or `None` if the session is
/// unknown or has expired.  Expired rows are left for `cleanup_expired_sessions`.
pub async fn get_session_user(
    pool: &SqlitePool,
    session_id: &str,
) -> sqlx::Result<Option<SessionUser>> {
    let row = sqlx::query(
        "SELECT s.user_id, s.expires_at, u.username
         FROM sessions s
         JOIN users u ON u.id = s.user_id
         WHERE s.session_id = ?",
    )
    .bind(session_id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    if row.get::<i64, _>("expires_at") <= get_timestamp() {
        return Ok(None);
    }

    Ok(Some(SessionUser {
        user_id: row.get("user_id"),
        username: row.get("username"),
    }))
}

/// Delete a session (logout).  Returns whether a row was actually removed.
pub async fn delete_session(pool: &SqlitePool, session_id: &str) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM sessions WHERE session_id = ?")
        .bind(session_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Clean up expired sessions
pub async fn cleanup_expired_sessions(pool: &SqlitePool) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
        .bind(get_timestamp())
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
