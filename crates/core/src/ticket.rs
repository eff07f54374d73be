//! Ticket lifecycle rules.
//!
//! Defines the ticket statuses and priorities, the transition table, and the
//! actor guards evaluated before every lifecycle write. The guards only look
//! at a [`TicketParties`] snapshot; the repository layer repeats the status
//! precondition inside its conditional `UPDATE`, so two writers racing on the
//! same ticket cannot both succeed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Escalated,
    Closed,
}

impl TicketStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::Open,
        TicketStatus::InProgress,
        TicketStatus::Escalated,
        TicketStatus::Closed,
    ];

    /// The value stored in `tickets.status`.
    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Escalated => "escalated",
            TicketStatus::Closed => "closed",
        }
    }

    /// Parse a stored or user-supplied status value.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == value)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid ticket status '{value}'. Must be one of: open, in_progress, escalated, closed"
                ))
            })
    }

    /// `true` only for [`TicketStatus::Closed`]; no transition leaves it.
    pub fn is_terminal(self) -> bool {
        self == TicketStatus::Closed
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Ticket priority as chosen by the creator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TicketPriority {
    pub const ALL: [TicketPriority; 4] = [
        TicketPriority::Low,
        TicketPriority::Medium,
        TicketPriority::High,
        TicketPriority::Urgent,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TicketPriority::Low => "low",
            TicketPriority::Medium => "medium",
            TicketPriority::High => "high",
            TicketPriority::Urgent => "urgent",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == value)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid ticket priority '{value}'. Must be one of: low, medium, high, urgent"
                ))
            })
    }
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

/// Returns the statuses that `from` may transition to.
///
/// Transition rules:
/// - `open`        -> `in_progress` (claim)
/// - `in_progress` -> `escalated` (escalate), `closed` (close)
/// - `escalated`   -> `in_progress` (reassign), `closed` (close)
/// - `closed`      -> nothing
pub fn valid_transitions(from: TicketStatus) -> &'static [TicketStatus] {
    match from {
        TicketStatus::Open => &[TicketStatus::InProgress],
        TicketStatus::InProgress => &[TicketStatus::Escalated, TicketStatus::Closed],
        TicketStatus::Escalated => &[TicketStatus::InProgress, TicketStatus::Closed],
        TicketStatus::Closed => &[],
    }
}

/// Validate that `from -> to` is in the transition table.
pub fn validate_transition(from: TicketStatus, to: TicketStatus) -> Result<(), CoreError> {
    if valid_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(CoreError::InvalidState(format!(
            "Cannot transition ticket from '{from}' to '{to}'"
        )))
    }
}

// ---------------------------------------------------------------------------
// Actors and ticket snapshots
// ---------------------------------------------------------------------------

/// A user as resolved from the directory at request time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: DbId,
    pub department_id: Option<DbId>,
    pub is_admin: bool,
}

impl Actor {
    /// `true` if the user is a member of `department_id`.
    pub fn belongs_to(&self, department_id: DbId) -> bool {
        self.department_id == Some(department_id)
    }

    /// `true` if the user is an admin and a member of `department_id`.
    pub fn is_admin_of(&self, department_id: DbId) -> bool {
        self.is_admin && self.belongs_to(department_id)
    }
}

/// The lifecycle-relevant fields of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketParties {
    pub ticket_id: DbId,
    pub status: TicketStatus,
    pub created_by: DbId,
    pub assigned_to: Option<DbId>,
    pub source_department_id: DbId,
    pub destination_department_id: DbId,
}

impl TicketParties {
    /// Creator or current assignee.
    pub fn is_directly_related(&self, user_id: DbId) -> bool {
        self.created_by == user_id || self.assigned_to == Some(user_id)
    }

    /// `true` if `department_id` is the ticket's source or destination.
    pub fn is_related_department(&self, department_id: Option<DbId>) -> bool {
        department_id.is_some_and(|d| {
            d == self.source_department_id || d == self.destination_department_id
        })
    }

    pub fn is_assignee(&self, user_id: DbId) -> bool {
        self.assigned_to == Some(user_id)
    }
}

// ---------------------------------------------------------------------------
// Field validation
// ---------------------------------------------------------------------------

/// Maximum length of a ticket title (characters).
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length of a ticket description or escalation reason (characters).
pub const MAX_DESCRIPTION_LENGTH: usize = 10_000;

/// Validate and trim a ticket title.
pub fn validate_title(title: &str) -> Result<String, CoreError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(CoreError::Validation("Ticket title is required".into()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Ticket title exceeds maximum length of {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(title.to_string())
}

/// Validate and trim a ticket description.
pub fn validate_description(description: &str) -> Result<String, CoreError> {
    let description = description.trim();
    if description.is_empty() {
        return Err(CoreError::Validation("Ticket description is required".into()));
    }
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(CoreError::Validation(format!(
            "Ticket description exceeds maximum length of {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    Ok(description.to_string())
}

// ---------------------------------------------------------------------------
// Guards
// ---------------------------------------------------------------------------

/// Source department of a ticket opened by `creator`.
///
/// Fails with [`CoreError::UnassignedDepartment`] when the creator has none.
pub fn source_department_for(creator: &Actor) -> Result<DbId, CoreError> {
    creator
        .department_id
        .ok_or(CoreError::UnassignedDepartment {
            user_id: creator.user_id,
        })
}

/// Claim: the ticket must be open and unassigned, and the actor must belong
/// to the destination department.
pub fn check_claim(ticket: &TicketParties, actor: &Actor) -> Result<(), CoreError> {
    if !actor.belongs_to(ticket.destination_department_id) {
        return Err(CoreError::Forbidden(
            "Only members of the destination department can claim this ticket".into(),
        ));
    }
    if ticket.assigned_to.is_some() {
        return Err(CoreError::AlreadyAssigned {
            ticket_id: ticket.ticket_id,
        });
    }
    validate_transition(ticket.status, TicketStatus::InProgress)
}

/// Escalate: only the current assignee, with a non-empty reason, from
/// `in_progress`. Returns the trimmed reason.
pub fn check_escalate(
    ticket: &TicketParties,
    actor: &Actor,
    reason: &str,
) -> Result<String, CoreError> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(CoreError::Validation("Escalation reason is required".into()));
    }
    if reason.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(CoreError::Validation(format!(
            "Escalation reason exceeds maximum length of {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    if !ticket.is_assignee(actor.user_id) {
        return Err(CoreError::Forbidden(
            "Only the current assignee can escalate this ticket".into(),
        ));
    }
    validate_transition(ticket.status, TicketStatus::Escalated)?;
    Ok(reason.to_string())
}

/// Reassign: only an admin of the *current* destination department, and
/// only while the ticket is escalated.
pub fn check_reassign(ticket: &TicketParties, actor: &Actor) -> Result<(), CoreError> {
    if !actor.is_admin_of(ticket.destination_department_id) {
        return Err(CoreError::Forbidden(
            "Only an admin of the destination department can reassign this ticket".into(),
        ));
    }
    if ticket.status != TicketStatus::Escalated {
        return Err(CoreError::InvalidState(format!(
            "Only escalated tickets can be reassigned (ticket is '{}')",
            ticket.status
        )));
    }
    Ok(())
}

/// Close: the assignee, or an admin belonging to the destination department,
/// from `in_progress` or `escalated`.
pub fn check_close(ticket: &TicketParties, actor: &Actor) -> Result<(), CoreError> {
    let permitted =
        ticket.is_assignee(actor.user_id) || actor.is_admin_of(ticket.destination_department_id);
    if !permitted {
        return Err(CoreError::Forbidden(
            "Only the assignee or a destination department admin can close this ticket".into(),
        ));
    }
    validate_transition(ticket.status, TicketStatus::Closed)
}

/// Generic status write.
///
/// Gated exactly like [`check_close`]: department membership alone is not
/// enough. Targets that need extra input (a claimant, a reason, a new
/// assignee) must go through their dedicated operation.
pub fn check_set_status(
    ticket: &TicketParties,
    actor: &Actor,
    target: TicketStatus,
) -> Result<(), CoreError> {
    if !actor.belongs_to(ticket.destination_department_id) {
        return Err(CoreError::Forbidden(
            "Only members of the destination department can change this ticket's status".into(),
        ));
    }
    match target {
        TicketStatus::Closed => check_close(ticket, actor),
        TicketStatus::InProgress if ticket.status == TicketStatus::Open => Err(
            CoreError::InvalidState("Use the claim operation to start work on a ticket".into()),
        ),
        TicketStatus::InProgress => Err(CoreError::InvalidState(
            "Use the reassign operation to return an escalated ticket to work".into(),
        )),
        TicketStatus::Escalated => Err(CoreError::InvalidState(
            "Use the escalate operation, which requires a reason".into(),
        )),
        TicketStatus::Open => Err(CoreError::InvalidState(format!(
            "Cannot transition ticket from '{}' to 'open'",
            ticket.status
        ))),
    }
}

/// Read access: anyone directly related, anyone in the source or destination
/// department, and admins.
pub fn can_view(ticket: &TicketParties, actor: &Actor) -> bool {
    actor.is_admin
        || ticket.is_directly_related(actor.user_id)
        || ticket.is_related_department(actor.department_id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
