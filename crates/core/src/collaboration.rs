//! Permission guards for direct messages and comments.
//!
//! Both guards are evaluated at send time, never cached: the answer changes
//! as the ticket moves through its lifecycle (a new assignee, an
//! escalation, a reassignment to another department). Message history that
//! was written while permitted stays readable afterwards.

use crate::error::CoreError;
use crate::ticket::{Actor, TicketParties, TicketStatus};

/// Maximum length of a message or comment body (characters).
pub const MAX_CONTENT_LENGTH: usize = 10_000;

/// Whether `a` and `b` may exchange direct messages about `ticket`.
///
/// Permitted when any of the following holds (in either direction):
/// 1. both users are directly related (creator or assignee);
/// 2. one is directly related and the other is an admin;
/// 3. one is directly related and the other belongs to the source or
///    destination department;
/// 4. the ticket is escalated, one user is an admin and the other belongs
///    to the source or destination department.
pub fn can_message(ticket: &TicketParties, a: &Actor, b: &Actor) -> bool {
    let a_related = ticket.is_directly_related(a.user_id);
    let b_related = ticket.is_directly_related(b.user_id);

    if a_related && b_related {
        return true;
    }

    let related_with = |related: bool, other: &Actor| {
        related && (other.is_admin || ticket.is_related_department(other.department_id))
    };
    if related_with(a_related, b) || related_with(b_related, a) {
        return true;
    }

    if ticket.status == TicketStatus::Escalated {
        let admin_with = |admin: &Actor, other: &Actor| {
            admin.is_admin && ticket.is_related_department(other.department_id)
        };
        return admin_with(a, b) || admin_with(b, a);
    }

    false
}

/// Whether `actor` may comment on `ticket`: the creator, the assignee, or an
/// admin of the destination department.
pub fn can_comment(ticket: &TicketParties, actor: &Actor) -> bool {
    ticket.is_directly_related(actor.user_id)
        || actor.is_admin_of(ticket.destination_department_id)
}

/// Validate and trim a message or comment body.
pub fn validate_content(content: &str) -> Result<String, CoreError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(CoreError::Validation("Content must not be empty".into()));
    }
    if content.chars().count() > MAX_CONTENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Content exceeds maximum length of {MAX_CONTENT_LENGTH} characters"
        )));
    }
    Ok(content.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DbId;

    const SOURCE: DbId = 1;
    const DEST: DbId = 2;
    const OTHER: DbId = 9;

    fn ticket(status: TicketStatus, assigned_to: Option<DbId>) -> TicketParties {
        TicketParties {
            ticket_id: 7,
            status,
            created_by: 10,
            assigned_to,
            source_department_id: SOURCE,
            destination_department_id: DEST,
        }
    }

    fn user(user_id: DbId, department_id: Option<DbId>, is_admin: bool) -> Actor {
        Actor {
            user_id,
            department_id,
            is_admin,
        }
    }

    #[test]
    fn creator_and_assignee_may_message() {
        let t = ticket(TicketStatus::InProgress, Some(20));
        let creator = user(10, Some(SOURCE), false);
        let assignee = user(20, Some(DEST), false);
        assert!(can_message(&t, &creator, &assignee));
        assert!(can_message(&t, &assignee, &creator));
    }

    #[test]
    fn creator_may_message_destination_member_before_claim() {
        let t = ticket(TicketStatus::Open, None);
        let creator = user(10, Some(SOURCE), false);
        let member = user(20, Some(DEST), false);
        assert!(can_message(&t, &creator, &member));
    }

    #[test]
    fn related_user_may_message_any_admin() {
        let t = ticket(TicketStatus::Open, None);
        let creator = user(10, Some(SOURCE), false);
        let admin = user(30, Some(OTHER), true);
        assert!(can_message(&t, &admin, &creator));
    }

    #[test]
    fn unrelated_outsider_is_denied() {
        let creator = user(10, Some(SOURCE), false);
        let outsider = user(40, Some(OTHER), false);
        let homeless = user(41, None, false);
        for status in [TicketStatus::Open, TicketStatus::InProgress] {
            let t = ticket(status, Some(20));
            assert!(!can_message(&t, &creator, &outsider));
            assert!(!can_message(&t, &creator, &homeless));
        }
    }

    #[test]
    fn two_department_members_need_escalation_and_an_admin() {
        let member = user(50, Some(SOURCE), false);
        let admin = user(51, Some(DEST), true);

        let in_progress = ticket(TicketStatus::InProgress, Some(20));
        assert!(!can_message(&in_progress, &member, &admin));

        let escalated = ticket(TicketStatus::Escalated, Some(20));
        assert!(can_message(&escalated, &member, &admin));
        assert!(can_message(&escalated, &admin, &member));

        let peer = user(52, Some(DEST), false);
        assert!(!can_message(&escalated, &member, &peer));
    }

    #[test]
    fn escalation_rule_needs_a_related_department() {
        let escalated = ticket(TicketStatus::Escalated, Some(20));
        let admin = user(51, Some(OTHER), true);
        let outsider = user(40, Some(OTHER), false);
        assert!(!can_message(&escalated, &admin, &outsider));
    }

    #[test]
    fn comment_permission() {
        let t = ticket(TicketStatus::InProgress, Some(20));
        assert!(can_comment(&t, &user(10, Some(SOURCE), false)));
        assert!(can_comment(&t, &user(20, Some(DEST), false)));
        assert!(can_comment(&t, &user(30, Some(DEST), true)));
        assert!(!can_comment(&t, &user(31, Some(SOURCE), true)));
        assert!(!can_comment(&t, &user(32, Some(DEST), false)));
    }

    #[test]
    fn content_must_not_be_blank() {
        assert_eq!(validate_content("  hello ").unwrap(), "hello");
        assert!(validate_content(" \n ").is_err());
        assert!(validate_content(&"a".repeat(MAX_CONTENT_LENGTH + 1)).is_err());
    }
}
