//! Database access for accounts.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{Instrument, info_span};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, username, email, password_hash, verify_code, \
                            verify_code_expires, is_verified, is_accepting_messages";

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub verify_code: Option<String>,
    pub verify_code_expires: Option<DateTime<Utc>>,
    pub is_verified: bool,
    pub is_accepting_messages: bool,
}

/// # Errors
/// Returns an error if the query fails.
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserRow>> {
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "select",
        db.sql.table = "users"
    );

    sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("Failed to fetch user by id")
}

/// # Errors
/// Returns an error if the query fails.
pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<UserRow>> {
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "select",
        db.sql.table = "users"
    );

    sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
    ))
    .bind(username)
    .fetch_optional(pool)
    .instrument(span)
    .await
    .context("Failed to fetch user by username")
}

/// Only verified accounts reserve a username for good.
/// # Errors
/// Returns an error if the query fails.
pub async fn find_verified_by_username(pool: &PgPool, username: &str) -> Result<Option<UserRow>> {
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "select",
        db.sql.table = "users"
    );

    sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = $1 AND is_verified = TRUE"
    ))
    .bind(username)
    .fetch_optional(pool)
    .instrument(span)
    .await
    .context("Failed to fetch verified user by username")
}

/// # Errors
/// Returns an error if the query fails.
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>> {
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "select",
        db.sql.table = "users"
    );

    sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("Failed to fetch user by email")
}

/// Insert a fresh account. The raw `sqlx` error is surfaced so callers can
/// map unique violations to a conflict response.
/// # Errors
/// Returns the underlying database error.
pub async fn insert_user(
    pool: &PgPool,
    username: &str,
    email: &str,
    password_hash: &str,
    verify_code: &str,
    verify_code_expires: DateTime<Utc>,
) -> Result<Uuid, sqlx::Error> {
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "insert",
        db.sql.table = "users"
    );

    let row: (Uuid,) = sqlx::query_as(
        "INSERT INTO users (username, email, password_hash, verify_code, verify_code_expires) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(verify_code)
    .bind(verify_code_expires)
    .fetch_one(pool)
    .instrument(span)
    .await?;

    Ok(row.0)
}

/// An unverified account can be re-registered, replace its credentials and
/// start a new verification window. Returns `false` when no row was touched,
/// which means the account got verified between lookup and write. The raw
/// `sqlx` error is surfaced so callers can map a username collision to a
/// conflict response.
/// # Errors
/// Returns the underlying database error.
pub async fn update_unverified_account(
    pool: &PgPool,
    id: Uuid,
    username: &str,
    password_hash: &str,
    verify_code: &str,
    verify_code_expires: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "update",
        db.sql.table = "users"
    );

    let result = sqlx::query(
        "UPDATE users SET username = $2, password_hash = $3, verify_code = $4, \
         verify_code_expires = $5, updated_at = NOW() \
         WHERE id = $1 AND is_verified = FALSE",
    )
    .bind(id)
    .bind(username)
    .bind(password_hash)
    .bind(verify_code)
    .bind(verify_code_expires)
    .execute(pool)
    .instrument(span)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// The code columns are left in place, the password reset flow confirms its
/// code here and still needs it outstanding for the final step.
/// # Errors
/// Returns an error if the update fails.
pub async fn mark_verified(pool: &PgPool, id: Uuid) -> Result<()> {
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "update",
        db.sql.table = "users"
    );

    sqlx::query("UPDATE users SET is_verified = TRUE, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .instrument(span)
        .await
        .context("Failed to mark user verified")?;

    Ok(())
}

/// # Errors
/// Returns an error if the update fails.
pub async fn set_verify_code(
    pool: &PgPool,
    id: Uuid,
    verify_code: &str,
    verify_code_expires: DateTime<Utc>,
) -> Result<()> {
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "update",
        db.sql.table = "users"
    );

    sqlx::query(
        "UPDATE users SET verify_code = $2, verify_code_expires = $3, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(verify_code)
    .bind(verify_code_expires)
    .execute(pool)
    .instrument(span)
    .await
    .context("Failed to store verification code")?;

    Ok(())
}

/// Replace the password and consume the outstanding verification code.
/// # Errors
/// Returns an error if the update fails.
pub async fn reset_password(pool: &PgPool, id: Uuid, password_hash: &str) -> Result<()> {
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "update",
        db.sql.table = "users"
    );

    sqlx::query(
        "UPDATE users SET password_hash = $2, verify_code = NULL, \
         verify_code_expires = NULL, updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .bind(password_hash)
    .execute(pool)
    .instrument(span)
    .await
    .context("Failed to reset password")?;

    Ok(())
}

/// Returns `false` when the account no longer exists.
/// # Errors
/// Returns an error if the update fails.
pub async fn set_accepting_messages(pool: &PgPool, id: Uuid, accepting: bool) -> Result<bool> {
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "update",
        db.sql.table = "users"
    );

    let result =
        sqlx::query("UPDATE users SET is_accepting_messages = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(accepting)
            .execute(pool)
            .instrument(span)
            .await
            .context("Failed to update message acceptance")?;

    Ok(result.rows_affected() > 0)
}
