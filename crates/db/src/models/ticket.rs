//! Ticket entity model and DTOs.

use helpdesk_core::error::CoreError;
use helpdesk_core::ticket::{TicketParties, TicketPriority, TicketStatus};
use helpdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `tickets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ticket {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub priority: String,
    pub status: String,
    pub created_by: DbId,
    pub assigned_to: Option<DbId>,
    pub source_department_id: DbId,
    pub destination_department_id: DbId,
    pub escalation_reason: Option<String>,
    pub escalated_by: Option<DbId>,
    pub escalation_date: Option<Timestamp>,
    pub reassigned_by: Option<DbId>,
    pub reassignment_date: Option<Timestamp>,
    pub closed_by: Option<DbId>,
    pub creation_date: Timestamp,
    pub last_updated: Timestamp,
    pub resolution_date: Option<Timestamp>,
}

impl Ticket {
    /// Parsed lifecycle status.
    ///
    /// The `ck_tickets_status` constraint guarantees a known value; a parse
    /// failure means the schema and the code disagree.
    pub fn status(&self) -> Result<TicketStatus, CoreError> {
        TicketStatus::parse(&self.status).map_err(|_| {
            CoreError::Internal(format!(
                "ticket {} has unknown status '{}'",
                self.id, self.status
            ))
        })
    }

    /// Snapshot of the fields the lifecycle and permission guards look at.
    pub fn parties(&self) -> Result<TicketParties, CoreError> {
        Ok(TicketParties {
            ticket_id: self.id,
            status: self.status()?,
            created_by: self.created_by,
            assigned_to: self.assigned_to,
            source_department_id: self.source_department_id,
            destination_department_id: self.destination_department_id,
        })
    }
}

/// DTO for opening a ticket.
///
/// The source department is never supplied by the client; it is the
/// creator's department at creation time.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTicket {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 10000, message = "Description must be 1-10000 characters"))]
    pub description: String,
    #[serde(default)]
    pub priority: TicketPriority,
    pub destination_department_id: DbId,
}

/// DTO for the generic status write.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTicketStatus {
    pub status: TicketStatus,
}

/// DTO for escalating a ticket.
#[derive(Debug, Deserialize, Validate)]
pub struct EscalateTicket {
    #[validate(length(min = 1, message = "Escalation reason is required"))]
    pub reason: String,
}

/// DTO for reassigning an escalated ticket.
#[derive(Debug, Deserialize, Validate)]
pub struct ReassignTicket {
    pub assignee_id: DbId,
    pub department_id: DbId,
}

/// Which tickets a listing is scoped to, relative to the requesting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TicketScope {
    /// Tickets the user opened.
    #[default]
    Created,
    /// Tickets currently assigned to the user.
    Assigned,
    /// Tickets routed to the user's department.
    Department,
}

/// Query parameters for listing tickets.
#[derive(Debug, Deserialize)]
pub struct TicketListParams {
    #[serde(default)]
    pub scope: TicketScope,
    pub status: Option<TicketStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
