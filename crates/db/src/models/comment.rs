//! Comment entity model and DTOs.

use helpdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `comments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    pub ticket_id: DbId,
    pub user_id: DbId,
    pub content: String,
    pub creation_date: Timestamp,
}

/// DTO for adding a comment.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateComment {
    #[validate(length(min = 1, message = "Comment content is required"))]
    pub content: String,
}
