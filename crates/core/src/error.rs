use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("User {user_id} has no department and cannot open tickets")]
    UnassignedDepartment { user_id: DbId },

    #[error("Ticket {ticket_id} is already assigned")]
    AlreadyAssigned { ticket_id: DbId },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Messaging not permitted: {0}")]
    RelationDenied(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
