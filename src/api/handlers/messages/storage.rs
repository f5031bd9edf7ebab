//! Database access for the inbox.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{Instrument, info_span};
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub struct MessageRow {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// # Errors
/// Returns an error if the insert fails.
pub async fn insert_message(pool: &PgPool, user_id: Uuid, content: &str) -> Result<Uuid> {
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "insert",
        db.sql.table = "messages"
    );

    let row: (Uuid,) =
        sqlx::query_as("INSERT INTO messages (user_id, content) VALUES ($1, $2) RETURNING id")
            .bind(user_id)
            .bind(content)
            .fetch_one(pool)
            .instrument(span)
            .await
            .context("Failed to insert message")?;

    Ok(row.0)
}

/// Newest first, backed by the `(user_id, created_at DESC)` index.
/// # Errors
/// Returns an error if the query fails.
pub async fn list_messages(pool: &PgPool, user_id: Uuid) -> Result<Vec<MessageRow>> {
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "select",
        db.sql.table = "messages"
    );

    sqlx::query_as::<_, MessageRow>(
        "SELECT id, content, created_at FROM messages \
         WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .instrument(span)
    .await
    .context("Failed to list messages")
}

/// Delete one message, scoped to its owner. Returns `false` when nothing
/// matched, either a foreign id or an already-deleted message.
/// # Errors
/// Returns an error if the delete fails.
pub async fn delete_message(pool: &PgPool, user_id: Uuid, message_id: Uuid) -> Result<bool> {
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "delete",
        db.sql.table = "messages"
    );

    let result = sqlx::query("DELETE FROM messages WHERE id = $1 AND user_id = $2")
        .bind(message_id)
        .bind(user_id)
        .execute(pool)
        .instrument(span)
        .await
        .context("Failed to delete message")?;

    Ok(result.rows_affected() > 0)
}
