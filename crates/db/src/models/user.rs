//! User entity model and DTOs.

use helpdesk_core::ticket::Actor;
use helpdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub department_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// The permission-relevant view of this user.
    pub fn as_actor(&self) -> Actor {
        Actor {
            user_id: self.id,
            department_id: self.department_id,
            is_admin: self.is_admin,
        }
    }
}

/// DTO for creating a user.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub department_id: Option<DbId>,
}
