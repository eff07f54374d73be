//! Direct message entity model and DTOs.

use helpdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `messages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Message {
    pub id: DbId,
    pub ticket_id: DbId,
    pub sender_id: DbId,
    pub recipient_id: DbId,
    pub content: String,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for sending a message on a ticket.
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessage {
    pub recipient_id: DbId,
    #[validate(length(min = 1, message = "Message content is required"))]
    pub content: String,
}
