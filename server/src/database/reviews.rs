use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, SqlitePool};

use shared::types::{ReviewRecord, SearchFilter};

use super::utils::get_timestamp;

/// A validated review ready for insertion.  Wire submissions arrive as raw
/// strings; the write handler converts them into this before touching the DB.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub food_name: String,
    pub restaurant_name: String,
    pub author_name: String,
    pub food_price: i64,
    pub food_rating: i64,
    pub service_rating: i64,
    pub recommend_rating: i64,
    pub hashtags: Vec<String>,
}

/// Insert a review and return its row id
pub async fn insert_review(pool: &SqlitePool, review: NewReview) -> sqlx::Result<i64> {
    let hashtags =
        serde_json::to_string(&review.hashtags).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

    let result = sqlx::query(
        "INSERT INTO reviews
            (food_name, restaurant_name, author_name, food_price,
             food_rating, service_rating, recommend_rating, hashtags, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&review.food_name)
    .bind(&review.restaurant_name)
    .bind(&review.author_name)
    .bind(review.food_price)
    .bind(review.food_rating)
    .bind(review.service_rating)
    .bind(review.recommend_rating)
    .bind(hashtags)
    .bind(get_timestamp())
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Fetch a single review by id
pub async fn get_review(pool: &SqlitePool, review_id: i64) -> sqlx::Result<Option<ReviewRecord>> {
    let row = sqlx::query(
        "SELECT id, food_name, restaurant_name, author_name, food_price,
                food_rating, service_rating, recommend_rating, num_upvotes, hashtags
         FROM reviews WHERE id = ?",
    )
    .bind(review_id)
    .fetch_optional(pool)
    .await?;

    row.map(|row| row_to_record(&row)).transpose()
}

/// Delete a review.  Returns whether a row was actually removed.
pub async fn delete_review(pool: &SqlitePool, review_id: i64) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM reviews WHERE id = ?")
        .bind(review_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Toggle a user's upvote on a review.
///
/// Returns `None` if the review does not exist, otherwise the new upvote
/// state for that user.  The membership row and the `num_upvotes` counter
/// move together inside one transaction.
pub async fn toggle_upvote(
    pool: &SqlitePool,
    review_id: i64,
    user_id: i64,
) -> sqlx::Result<Option<bool>> {
    let mut tx = pool.begin().await?;

    let exists = sqlx::query("SELECT 1 FROM reviews WHERE id = ?")
        .bind(review_id)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        // Dropping the transaction rolls it back.
        return Ok(None);
    }

    let removed = sqlx::query("DELETE FROM review_upvotes WHERE review_id = ? AND user_id = ?")
        .bind(review_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let upvoted = if removed.rows_affected() > 0 {
        sqlx::query("UPDATE reviews SET num_upvotes = num_upvotes - 1 WHERE id = ?")
            .bind(review_id)
            .execute(&mut *tx)
            .await?;
        false
    } else {
        sqlx::query("INSERT INTO review_upvotes (review_id, user_id, created_at) VALUES (?, ?, ?)")
            .bind(review_id)
            .bind(user_id)
            .bind(get_timestamp())
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE reviews SET num_upvotes = num_upvotes + 1 WHERE id = ?")
            .bind(review_id)
            .execute(&mut *tx)
            .await?;
        true
    };

    tx.commit().await?;
    Ok(Some(upvoted))
}

/// Search reviews.
///
/// String and rating filters are exact-match, the price filter is an
/// inclusive range.  Hashtag filtering happens after the SQL pass: a review
/// matches only if it carries every requested tag.  Results come back newest
/// first.
pub async fn search_reviews(
    pool: &SqlitePool,
    filter: &SearchFilter,
) -> sqlx::Result<Vec<ReviewRecord>> {
    let mut qb = QueryBuilder::new(
        "SELECT id, food_name, restaurant_name, author_name, food_price,
                food_rating, service_rating, recommend_rating, num_upvotes, hashtags
         FROM reviews WHERE 1=1",
    );

    if let Some(v) = &filter.food_name {
        qb.push(" AND food_name = ").push_bind(v.clone());
    }
    if let Some(v) = &filter.restaurant_name {
        qb.push(" AND restaurant_name = ").push_bind(v.clone());
    }
    if let Some(v) = &filter.author_name {
        qb.push(" AND author_name = ").push_bind(v.clone());
    }
    if let Some(v) = filter.food_rating {
        qb.push(" AND food_rating = ").push_bind(v);
    }
    if let Some(v) = filter.service_rating {
        qb.push(" AND service_rating = ").push_bind(v);
    }
    if let Some(v) = filter.recommend_rating {
        qb.push(" AND recommend_rating = ").push_bind(v);
    }
    if let Some((lo, hi)) = filter.food_price_range {
        qb.push(" AND food_price BETWEEN ")
            .push_bind(lo)
            .push(" AND ")
            .push_bind(hi);
    }

    qb.push(" ORDER BY created_at DESC, id DESC");

    let rows = qb.build().fetch_all(pool).await?;

    let mut results = Vec::with_capacity(rows.len());
    for row in rows {
        let record = row_to_record(&row)?;
        if let Some(required) = &filter.hashtags {
            if !required.iter().all(|tag| record.hashtags.contains(tag)) {
                continue;
            }
        }
        results.push(record);
    }

    Ok(results)
}

fn row_to_record(row: &SqliteRow) -> sqlx::Result<ReviewRecord> {
    let hashtags: Vec<String> = serde_json::from_str(row.get::<String, _>("hashtags").as_str())
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

    Ok(ReviewRecord {
        id: row.get("id"),
        food_name: row.get("food_name"),
        restaurant_name: row.get("restaurant_name"),
        author_name: row.get("author_name"),
        food_price: row.get("food_price"),
        food_rating: row.get("food_rating"),
        service_rating: row.get("service_rating"),
        recommend_rating: row.get("recommend_rating"),
        num_upvotes: row.get("num_upvotes"),
        hashtags,
    })
}
