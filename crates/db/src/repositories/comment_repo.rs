//! Repository for the `comments` table.

use helpdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::comment::Comment;

/// Column list for `comments` queries.
const COLUMNS: &str = "id, ticket_id, user_id, content, creation_date";

/// Provides persistence for ticket comments.
pub struct CommentRepo;

impl CommentRepo {
    /// Append a comment to a ticket.
    pub async fn create(
        pool: &PgPool,
        ticket_id: DbId,
        user_id: DbId,
        content: &str,
    ) -> Result<Comment, sqlx::Error> {
        let query = format!(
            "INSERT INTO comments (ticket_id, user_id, content) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(ticket_id)
            .bind(user_id)
            .bind(content)
            .fetch_one(pool)
            .await
    }

    /// Find a comment by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM comments WHERE id = $1");
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All comments on a ticket, oldest first.
    pub async fn list_for_ticket(
        pool: &PgPool,
        ticket_id: DbId,
    ) -> Result<Vec<Comment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM comments WHERE ticket_id = $1 \
             ORDER BY creation_date ASC, id ASC"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(ticket_id)
            .fetch_all(pool)
            .await
    }

    /// Delete a comment, but only if `user_id` wrote it.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete_by_author(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
