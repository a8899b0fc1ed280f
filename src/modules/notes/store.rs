//! Note queries.

use anyhow::Context;
use sqlx::SqlitePool;
use time::OffsetDateTime;

use super::models::{Note, NoteInput};
use shelf_authz::UserId;

const NOTE_COLUMNS: &str = "id, shelf_id, user_id, title, content, created_at";

pub async fn insert_note(
    pool: &SqlitePool,
    shelf_id: i64,
    author: UserId,
    input: &NoteInput,
) -> anyhow::Result<Note> {
    sqlx::query_as::<_, Note>(&format!(
        "INSERT INTO notes (shelf_id, user_id, title, content, created_at)
         VALUES (?, ?, ?, ?, ?)
         RETURNING {}",
        NOTE_COLUMNS
    ))
    .bind(shelf_id)
    .bind(author)
    .bind(&input.title)
    .bind(&input.content)
    .bind(OffsetDateTime::now_utc())
    .fetch_one(pool)
    .await
    .context("failed to create note")
}

/// The author's notes, most recent first.
pub async fn list_for_user(pool: &SqlitePool, author: UserId) -> anyhow::Result<Vec<Note>> {
    sqlx::query_as::<_, Note>(&format!(
        "SELECT {} FROM notes WHERE user_id = ? ORDER BY created_at DESC, id DESC",
        NOTE_COLUMNS
    ))
    .bind(author)
    .fetch_all(pool)
    .await
    .with_context(|| format!("failed to list notes of user {}", author))
}

pub async fn get_note(pool: &SqlitePool, id: i64) -> anyhow::Result<Option<Note>> {
    sqlx::query_as::<_, Note>(&format!("SELECT {} FROM notes WHERE id = ?", NOTE_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("failed to load note {}", id))
}

pub async fn update_note(
    pool: &SqlitePool,
    id: i64,
    input: &NoteInput,
) -> anyhow::Result<Option<Note>> {
    sqlx::query_as::<_, Note>(&format!(
        "UPDATE notes SET title = ?, content = ? WHERE id = ? RETURNING {}",
        NOTE_COLUMNS
    ))
    .bind(&input.title)
    .bind(&input.content)
    .bind(id)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("failed to update note {}", id))
}

pub async fn delete_note(pool: &SqlitePool, id: i64) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM notes WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .with_context(|| format!("failed to delete note {}", id))?;
    Ok(result.rows_affected() > 0)
}
