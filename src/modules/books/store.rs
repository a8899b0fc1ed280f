//! Shelf and review queries.

use anyhow::Context;
use sqlx::SqlitePool;

use super::models::{RankedShelf, Review, ReviewInput, Shelf, ShelfInput};
use shelf_authz::UserId;

const SHELF_COLUMNS: &str = "id, title, text, category, thumbnail, user_id";

/// Every shelf, newest first.
pub async fn list_shelves(pool: &SqlitePool) -> anyhow::Result<Vec<Shelf>> {
    sqlx::query_as::<_, Shelf>(&format!(
        "SELECT {} FROM shelves ORDER BY id DESC",
        SHELF_COLUMNS
    ))
    .fetch_all(pool)
    .await
    .context("failed to list shelves")
}

/// Shelves ordered by mean review rate, best first.
///
/// Unreviewed shelves have no average and sort after every reviewed one;
/// equal averages fall back to newest first.
pub async fn ranking(pool: &SqlitePool, limit: i64) -> anyhow::Result<Vec<RankedShelf>> {
    sqlx::query_as::<_, RankedShelf>(
        "SELECT s.id, s.title, s.text, s.category, s.thumbnail, s.user_id,
                AVG(r.rate) AS average_rate
         FROM shelves s
         LEFT JOIN reviews r ON r.shelf_id = s.id
         GROUP BY s.id
         ORDER BY average_rate IS NULL, average_rate DESC, s.id DESC
         LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("failed to rank shelves")
}

pub async fn get_shelf(pool: &SqlitePool, id: i64) -> anyhow::Result<Option<Shelf>> {
    sqlx::query_as::<_, Shelf>(&format!(
        "SELECT {} FROM shelves WHERE id = ?",
        SHELF_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("failed to load shelf {}", id))
}

pub async fn insert_shelf(
    pool: &SqlitePool,
    owner: UserId,
    input: &ShelfInput,
    thumbnail: Option<&str>,
) -> anyhow::Result<Shelf> {
    sqlx::query_as::<_, Shelf>(&format!(
        "INSERT INTO shelves (title, text, category, thumbnail, user_id)
         VALUES (?, ?, ?, ?, ?)
         RETURNING {}",
        SHELF_COLUMNS
    ))
    .bind(&input.title)
    .bind(&input.text)
    .bind(input.category)
    .bind(thumbnail)
    .bind(owner)
    .fetch_one(pool)
    .await
    .context("failed to create shelf")
}

/// Overwrite the editable fields. A `None` thumbnail keeps the current one.
pub async fn update_shelf(
    pool: &SqlitePool,
    id: i64,
    input: &ShelfInput,
    thumbnail: Option<&str>,
) -> anyhow::Result<Option<Shelf>> {
    sqlx::query_as::<_, Shelf>(&format!(
        "UPDATE shelves
         SET title = ?, text = ?, category = ?, thumbnail = COALESCE(?, thumbnail)
         WHERE id = ?
         RETURNING {}",
        SHELF_COLUMNS
    ))
    .bind(&input.title)
    .bind(&input.text)
    .bind(input.category)
    .bind(thumbnail)
    .bind(id)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("failed to update shelf {}", id))
}

/// Delete a shelf; its reviews and notes go with it.
pub async fn delete_shelf(pool: &SqlitePool, id: i64) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM shelves WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .with_context(|| format!("failed to delete shelf {}", id))?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_reviews(pool: &SqlitePool, shelf_id: i64) -> anyhow::Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews WHERE shelf_id = ?")
        .bind(shelf_id)
        .fetch_one(pool)
        .await
        .context("failed to count reviews")?;
    Ok(count)
}

/// One window of a shelf's reviews, newest first.
pub async fn reviews_page(
    pool: &SqlitePool,
    shelf_id: i64,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<Review>> {
    sqlx::query_as::<_, Review>(
        "SELECT id, shelf_id, title, text, rate, user_id
         FROM reviews
         WHERE shelf_id = ?
         ORDER BY id DESC
         LIMIT ? OFFSET ?",
    )
    .bind(shelf_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("failed to load reviews")
}

pub async fn insert_review(
    pool: &SqlitePool,
    shelf_id: i64,
    author: UserId,
    input: &ReviewInput,
) -> anyhow::Result<Review> {
    sqlx::query_as::<_, Review>(
        "INSERT INTO reviews (shelf_id, title, text, rate, user_id)
         VALUES (?, ?, ?, ?, ?)
         RETURNING id, shelf_id, title, text, rate, user_id",
    )
    .bind(shelf_id)
    .bind(&input.title)
    .bind(&input.text)
    .bind(input.rate)
    .bind(author)
    .fetch_one(pool)
    .await
    .context("failed to create review")
}
