//! Users and sessions.

use anyhow::{anyhow, Context};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use sqlx::SqlitePool;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use super::models::User;
use shelf_authz::UserId;

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| anyhow!("invalid password hash: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

pub async fn username_taken(pool: &SqlitePool, username: &str) -> anyhow::Result<bool> {
    let row = sqlx::query("SELECT 1 FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await
        .context("failed to look up username")?;
    Ok(row.is_some())
}

pub async fn create_user(pool: &SqlitePool, username: &str, password: &str) -> anyhow::Result<User> {
    let password_hash = hash_password(password)?;

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (username, password_hash, date_joined)
         VALUES (?, ?, ?)
         RETURNING id, username, date_joined",
    )
    .bind(username)
    .bind(password_hash)
    .bind(OffsetDateTime::now_utc())
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to create user '{}'", username))?;

    tracing::info!(user_id = user.id, username = %user.username, "user created");
    Ok(user)
}

/// Whether `error` is the database rejecting a duplicate username.
pub fn is_unique_violation(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<sqlx::Error>(),
        Some(sqlx::Error::Database(db)) if db.is_unique_violation()
    )
}

/// The user whose password matches, if any.
pub async fn authenticate(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> anyhow::Result<Option<User>> {
    let row: Option<(UserId, String, OffsetDateTime, String)> = sqlx::query_as(
        "SELECT id, username, date_joined, password_hash FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await
    .context("failed to load credentials")?;

    let Some((id, username, date_joined, password_hash)) = row else {
        return Ok(None);
    };

    if !verify_password(password, &password_hash)? {
        return Ok(None);
    }

    Ok(Some(User {
        id,
        username,
        date_joined,
    }))
}

/// Open a session for `user_id` and return its token.
pub async fn create_session(
    pool: &SqlitePool,
    user_id: UserId,
    ttl_hours: i64,
) -> anyhow::Result<String> {
    let token = Uuid::new_v4().simple().to_string();
    let now = OffsetDateTime::now_utc();
    let expires_at = now + Duration::hours(ttl_hours);

    sqlx::query(
        "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&token)
    .bind(user_id)
    .bind(now.unix_timestamp())
    .bind(expires_at.unix_timestamp())
    .execute(pool)
    .await
    .context("failed to create session")?;

    Ok(token)
}

/// The user behind an unexpired session token.
pub async fn user_for_session(pool: &SqlitePool, token: &str) -> anyhow::Result<Option<User>> {
    sqlx::query_as::<_, User>(
        "SELECT u.id, u.username, u.date_joined
         FROM sessions s
         JOIN users u ON u.id = s.user_id
         WHERE s.token = ? AND s.expires_at > ?",
    )
    .bind(token)
    .bind(OffsetDateTime::now_utc().unix_timestamp())
    .fetch_optional(pool)
    .await
    .context("failed to resolve session")
}

pub async fn delete_session(pool: &SqlitePool, token: &str) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await
        .context("failed to delete session")?;
    Ok(())
}

/// Drop expired sessions; returns how many were removed.
pub async fn purge_expired_sessions(pool: &SqlitePool) -> anyhow::Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(OffsetDateTime::now_utc().unix_timestamp())
        .execute(pool)
        .await
        .context("failed to purge sessions")?;
    Ok(result.rows_affected())
}
