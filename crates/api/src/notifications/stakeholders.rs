//! Stakeholder resolution against the ticket store and directory.

use std::collections::BTreeSet;

use helpdesk_core::stakeholders;
use helpdesk_core::types::DbId;
use helpdesk_db::repositories::{TicketRepo, UserRepo};
use helpdesk_db::DbPool;

use crate::error::AppResult;

/// Creator, assignee, and every destination-department member of a ticket.
///
/// A ticket that no longer exists has no stakeholders; this is an empty set,
/// not an error.
pub async fn resolve(pool: &DbPool, ticket_id: DbId) -> AppResult<BTreeSet<DbId>> {
    recipients(pool, ticket_id, None).await
}

/// [`resolve`] minus the actor who caused the event.
pub async fn recipients(
    pool: &DbPool,
    ticket_id: DbId,
    excluded_actor: Option<DbId>,
) -> AppResult<BTreeSet<DbId>> {
    let Some(ticket) = TicketRepo::find_by_id(pool, ticket_id).await? else {
        tracing::debug!(ticket_id, "Ticket gone, no stakeholders to resolve");
        return Ok(BTreeSet::new());
    };
    let parties = ticket.parties()?;
    let members = UserRepo::member_ids(pool, parties.destination_department_id).await?;
    Ok(stakeholders::recipients(&parties, &members, excluded_actor))
}
