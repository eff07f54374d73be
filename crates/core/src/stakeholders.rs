//! Stakeholder resolution.
//!
//! A stakeholder is anyone with a legitimate interest in a ticket's outcome:
//! the creator, the current assignee, and every member of the destination
//! department. The computation is a pure function over the ticket snapshot
//! and the destination department's member list, so it can be tested without
//! a database or a live channel.

use std::collections::BTreeSet;

use crate::ticket::TicketParties;
use crate::types::DbId;

/// Deduplicated stakeholder ids for a ticket.
pub fn resolve(ticket: &TicketParties, destination_members: &[DbId]) -> BTreeSet<DbId> {
    let mut ids: BTreeSet<DbId> = destination_members.iter().copied().collect();
    ids.insert(ticket.created_by);
    if let Some(assignee) = ticket.assigned_to {
        ids.insert(assignee);
    }
    ids
}

/// Stakeholders minus the actor who caused the event.
pub fn recipients(
    ticket: &TicketParties,
    destination_members: &[DbId],
    excluded_actor: Option<DbId>,
) -> BTreeSet<DbId> {
    let mut ids = resolve(ticket, destination_members);
    if let Some(actor) = excluded_actor {
        ids.remove(&actor);
    }
    ids
}
