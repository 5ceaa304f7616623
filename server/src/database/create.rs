use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tracing::info;

/// Current schema version.  Bump this whenever the schema changes and add a
/// corresponding migration arm in `run_migrations`.
const SCHEMA_VERSION: u32 = 1;

/// Open or create the database and ensure the schema is up to date.
pub async fn open_database(path: &str) -> sqlx::Result<SqlitePool> {
    let opts = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await?;

    create_tables(&pool).await?;
    Ok(pool)
}

/// Initialize the database schema and run any pending migrations.
pub async fn create_tables(pool: &SqlitePool) -> sqlx::Result<()> {
    create_schema(pool).await?;
    run_migrations(pool).await?;
    Ok(())
}

/// Create all tables for a brand-new database (version 1 schema).
async fn create_schema(pool: &SqlitePool) -> sqlx::Result<()> {
    // Users table.  Usernames are email addresses.  Rows appear only once the
    // emailed activation link is followed; until then the account exists
    // nowhere but inside the sealed ticket.
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            username      TEXT    NOT NULL UNIQUE,
            password_hash TEXT    NOT NULL,
            created_at    INTEGER NOT NULL,
            last_login    INTEGER
        )",
    )
    .execute(pool)
    .await?;

    // Sessions table: one row per live login, keyed by the opaque cookie
    // value in `session_id`.
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS sessions (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id    INTEGER NOT NULL,
            session_id TEXT    NOT NULL UNIQUE,
            created_at INTEGER NOT NULL,
            expires_at INTEGER NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )",
    )
    .execute(pool)
    .await?;

    // Reviews table.  `hashtags` is a JSON array of strings; `num_upvotes` is
    // kept in sync with review_upvotes inside the upvote transaction.
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS reviews (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            food_name        TEXT    NOT NULL,
            restaurant_name  TEXT    NOT NULL,
            author_name      TEXT    NOT NULL,
            food_price       INTEGER NOT NULL,
            food_rating      INTEGER NOT NULL,
            service_rating   INTEGER NOT NULL,
            recommend_rating INTEGER NOT NULL,
            num_upvotes      INTEGER NOT NULL DEFAULT 0,
            hashtags         TEXT    NOT NULL DEFAULT '[]',
            created_at       INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    // One row per (review, user) upvote pair; toggling off deletes the row.
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS review_upvotes (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            review_id  INTEGER NOT NULL,
            user_id    INTEGER NOT NULL,
            created_at INTEGER NOT NULL,
            FOREIGN KEY (review_id) REFERENCES reviews(id) ON DELETE CASCADE,
            FOREIGN KEY (user_id)   REFERENCES users(id)   ON DELETE CASCADE,
            UNIQUE(review_id, user_id)
        )",
    )
    .execute(pool)
    .await?;

    // --- Indexes --------------------------------------------------------
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_username      ON users(username)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_session_id ON sessions(session_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_user_id    ON sessions(user_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_reviews_food        ON reviews(food_name)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_reviews_restaurant  ON reviews(restaurant_name)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_reviews_author      ON reviews(author_name)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_upvotes_review      ON review_upvotes(review_id)")
        .execute(pool)
        .await?;

    // Stamp fresh databases; existing ones keep their version for
    // `run_migrations` to inspect.
    if schema_version(pool).await? == 0 {
        sqlx::query(&format!("PRAGMA user_version = {}", SCHEMA_VERSION))
            .execute(pool)
            .await?;
    }

    Ok(())
}

/// Apply any schema migrations required to reach `SCHEMA_VERSION`.
///
/// Uses `PRAGMA user_version` as the migration counter.
/// Each migration arm is idempotent: safe to run on a DB that was created
/// at any earlier version.
async fn run_migrations(pool: &SqlitePool) -> sqlx::Result<()> {
    let current_version = schema_version(pool).await?;

    if current_version >= SCHEMA_VERSION {
        return Ok(());
    }

    info!(
        "Database schema at version {}; target version {}. Running migrations…",
        current_version, SCHEMA_VERSION
    );

    // Add future migration arms here:
    // if current_version < 2 { ... }

    sqlx::query(&format!("PRAGMA user_version = {}", SCHEMA_VERSION))
        .execute(pool)
        .await?;

    Ok(())
}

async fn schema_version(pool: &SqlitePool) -> sqlx::Result<u32> {
    let row = sqlx::query("PRAGMA user_version").fetch_one(pool).await?;
    Ok(row.get::<i64, _>(0) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fresh_database_is_stamped_with_current_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.db");
        let pool = open_database(path.to_str().unwrap()).await.unwrap();

        assert_eq!(schema_version(&pool).await.unwrap(), SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn reopening_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reopen.db");

        {
            let pool = open_database(path.to_str().unwrap()).await.unwrap();
            sqlx::query(
                "INSERT INTO users (username, password_hash, created_at)
                 VALUES ('a@b.co', 'x', 0)",
            )
            .execute(&pool)
            .await
            .unwrap();
            pool.close().await;
        }

        let pool = open_database(path.to_str().unwrap()).await.unwrap();
        let row = sqlx::query("SELECT COUNT(*) AS n FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(row.get::<i64, _>("n"), 1);
        assert_eq!(schema_version(&pool).await.unwrap(), SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn duplicate_usernames_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dup.db");
        let pool = open_database(path.to_str().unwrap()).await.unwrap();

        sqlx::query(
            "INSERT INTO users (username, password_hash, created_at)
             VALUES ('a@b.co', 'x', 0)",
        )
        .execute(&pool)
        .await
        .unwrap();

        let dup = sqlx::query(
            "INSERT INTO users (username, password_hash, created_at)
             VALUES ('a@b.co', 'y', 1)",
        )
        .execute(&pool)
        .await;
        assert!(dup.is_err());
    }
}
