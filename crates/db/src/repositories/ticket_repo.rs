//! Repository for the `tickets` table.
//!
//! Every lifecycle write is a single conditional `UPDATE` whose `WHERE`
//! clause restates the precondition the caller checked (expected status,
//! assignee, destination department). Postgres row locking makes that the
//! serialization point: when two actors race, exactly one statement matches
//! and the other returns `None`, which the caller turns into
//! `AlreadyAssigned` / `InvalidState` after re-reading the row.

use helpdesk_core::ticket::{TicketPriority, TicketStatus};
use helpdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::ticket::{Ticket, TicketScope};

/// Column list for `tickets` queries.
const COLUMNS: &str = "\
    id, title, description, priority, status, created_by, assigned_to, \
    source_department_id, destination_department_id, \
    escalation_reason, escalated_by, escalation_date, \
    reassigned_by, reassignment_date, closed_by, \
    creation_date, last_updated, resolution_date";

/// Validated input for [`TicketRepo::create`].
#[derive(Debug, Clone)]
pub struct NewTicket<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub priority: TicketPriority,
    pub created_by: DbId,
    pub source_department_id: DbId,
    pub destination_department_id: DbId,
}

/// Provides CRUD and lifecycle operations for tickets.
pub struct TicketRepo;

impl TicketRepo {
    /// Insert a new open, unassigned ticket.
    pub async fn create(pool: &PgPool, input: &NewTicket<'_>) -> Result<Ticket, sqlx::Error> {
        let query = format!(
            "INSERT INTO tickets \
                (title, description, priority, status, created_by, \
                 source_department_id, destination_department_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(input.title)
            .bind(input.description)
            .bind(input.priority.as_str())
            .bind(TicketStatus::Open.as_str())
            .bind(input.created_by)
            .bind(input.source_department_id)
            .bind(input.destination_department_id)
            .fetch_one(pool)
            .await
    }

    /// Find a ticket by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tickets WHERE id = $1");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List tickets relative to a user, newest first.
    ///
    /// `department_id` is only consulted for [`TicketScope::Department`]; a
    /// user without a department gets an empty list for that scope.
    pub async fn list_scoped(
        pool: &PgPool,
        scope: TicketScope,
        user_id: DbId,
        department_id: Option<DbId>,
        status: Option<TicketStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Ticket>, sqlx::Error> {
        let (scope_clause, scope_value) = match scope {
            TicketScope::Created => ("created_by = $1", Some(user_id)),
            TicketScope::Assigned => ("assigned_to = $1", Some(user_id)),
            TicketScope::Department => ("destination_department_id = $1", department_id),
        };
        let Some(scope_value) = scope_value else {
            return Ok(Vec::new());
        };

        let query = format!(
            "SELECT {COLUMNS} FROM tickets \
             WHERE {scope_clause} AND ($2::TEXT IS NULL OR status = $2) \
             ORDER BY creation_date DESC, id DESC \
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(scope_value)
            .bind(status.map(TicketStatus::as_str))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Claim an open ticket for `actor_id`.
    ///
    /// Matches only while the ticket is still open, unassigned, and routed to
    /// `destination_department_id`.
    pub async fn claim(
        pool: &PgPool,
        id: DbId,
        actor_id: DbId,
        destination_department_id: DbId,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!(
            "UPDATE tickets \
             SET assigned_to = $2, status = 'in_progress', last_updated = NOW() \
             WHERE id = $1 AND status = 'open' AND assigned_to IS NULL \
               AND destination_department_id = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(actor_id)
            .bind(destination_department_id)
            .fetch_optional(pool)
            .await
    }

    /// Escalate an in-progress ticket. Matches only while `actor_id` is
    /// still the assignee.
    pub async fn escalate(
        pool: &PgPool,
        id: DbId,
        actor_id: DbId,
        reason: &str,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!(
            "UPDATE tickets \
             SET status = 'escalated', escalation_reason = $3, escalated_by = $2, \
                 escalation_date = NOW(), last_updated = NOW() \
             WHERE id = $1 AND status = 'in_progress' AND assigned_to = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(actor_id)
            .bind(reason)
            .fetch_optional(pool)
            .await
    }

    /// Move an escalated ticket to a new assignee and department.
    ///
    /// Matches only while the ticket is escalated and still routed to
    /// `expected_department_id` (the department the admin was checked
    /// against).
    pub async fn reassign(
        pool: &PgPool,
        id: DbId,
        admin_id: DbId,
        expected_department_id: DbId,
        new_assignee_id: DbId,
        new_department_id: DbId,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!(
            "UPDATE tickets \
             SET assigned_to = $4, destination_department_id = $5, status = 'in_progress', \
                 reassigned_by = $2, reassignment_date = NOW(), last_updated = NOW() \
             WHERE id = $1 AND status = 'escalated' AND destination_department_id = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(admin_id)
            .bind(expected_department_id)
            .bind(new_assignee_id)
            .bind(new_department_id)
            .fetch_optional(pool)
            .await
    }

    /// Close a ticket that is in progress or escalated.
    ///
    /// `expected_status` and `expected_assignee` are the values the caller's
    /// permission check saw; the update only applies if neither changed.
    pub async fn close(
        pool: &PgPool,
        id: DbId,
        actor_id: DbId,
        expected_status: TicketStatus,
        expected_assignee: DbId,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!(
            "UPDATE tickets \
             SET status = 'closed', closed_by = $2, resolution_date = NOW(), last_updated = NOW() \
             WHERE id = $1 AND status = $3 AND assigned_to = $4 \
               AND status IN ('in_progress', 'escalated') \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(actor_id)
            .bind(expected_status.as_str())
            .bind(expected_assignee)
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete a ticket, returning the deleted row.
    ///
    /// Messages, comments and notifications go with it (`ON DELETE CASCADE`).
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!("DELETE FROM tickets WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
