//! Repository for the `messages` table.
//!
//! Messages are append-only; the only mutation is read-marking.

use helpdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::message::Message;

/// Column list for `messages` queries.
const COLUMNS: &str =
    "id, ticket_id, sender_id, recipient_id, content, is_read, read_at, created_at";

/// Provides persistence for direct messages.
pub struct MessageRepo;

impl MessageRepo {
    /// Insert a message, returning the full row.
    pub async fn create(
        pool: &PgPool,
        ticket_id: DbId,
        sender_id: DbId,
        recipient_id: DbId,
        content: &str,
    ) -> Result<Message, sqlx::Error> {
        let query = format!(
            "INSERT INTO messages (ticket_id, sender_id, recipient_id, content) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(ticket_id)
            .bind(sender_id)
            .bind(recipient_id)
            .bind(content)
            .fetch_one(pool)
            .await
    }

    /// All messages between two users on a ticket, oldest first.
    pub async fn conversation(
        pool: &PgPool,
        ticket_id: DbId,
        user_a: DbId,
        user_b: DbId,
    ) -> Result<Vec<Message>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM messages \
             WHERE ticket_id = $1 \
               AND ((sender_id = $2 AND recipient_id = $3) \
                 OR (sender_id = $3 AND recipient_id = $2)) \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(ticket_id)
            .bind(user_a)
            .bind(user_b)
            .fetch_all(pool)
            .await
    }

    /// Every message on a ticket that `user_id` sent or received, oldest first.
    pub async fn list_for_user_on_ticket(
        pool: &PgPool,
        ticket_id: DbId,
        user_id: DbId,
    ) -> Result<Vec<Message>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM messages \
             WHERE ticket_id = $1 AND (sender_id = $2 OR recipient_id = $2) \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(ticket_id)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Mark every unread message from `sender_id` to `recipient_id` on a
    /// ticket as read. Returns the IDs that changed.
    pub async fn mark_conversation_read(
        pool: &PgPool,
        ticket_id: DbId,
        sender_id: DbId,
        recipient_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE messages SET is_read = true, read_at = NOW() \
             WHERE ticket_id = $1 AND sender_id = $2 AND recipient_id = $3 AND is_read = false \
             RETURNING id",
        )
        .bind(ticket_id)
        .bind(sender_id)
        .bind(recipient_id)
        .fetch_all(pool)
        .await
    }

    /// Mark one message read on behalf of its recipient.
    ///
    /// Idempotent; returns `None` if the message does not exist or was not
    /// addressed to `recipient_id`.
    pub async fn mark_read(
        pool: &PgPool,
        message_id: DbId,
        recipient_id: DbId,
    ) -> Result<Option<Message>, sqlx::Error> {
        let query = format!(
            "UPDATE messages SET is_read = true, read_at = COALESCE(read_at, NOW()) \
             WHERE id = $1 AND recipient_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(message_id)
            .bind(recipient_id)
            .fetch_optional(pool)
            .await
    }

    /// Number of unread messages addressed to a user across all tickets.
    pub async fn unread_count(pool: &PgPool, recipient_id: DbId) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages WHERE recipient_id = $1 AND is_read = false",
        )
        .bind(recipient_id)
        .fetch_one(pool)
        .await?;
        Ok(count.unwrap_or(0))
    }
}
