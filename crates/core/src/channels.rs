//! Well-known notification type and live event name constants.
//!
//! Notification types must match the CHECK constraint on
//! `notifications.notification_type`. Live event names are what browser
//! clients subscribe to on the WebSocket.

use crate::types::DbId;

/// A ticket was opened towards the recipient's department.
pub const NOTIFICATION_NEW_TICKET: &str = "new_ticket";

/// A ticket the recipient has a stake in changed status or assignee.
pub const NOTIFICATION_STATUS_CHANGE: &str = "status_change";

/// Someone sent the recipient a direct message about a ticket.
pub const NOTIFICATION_NEW_MESSAGE: &str = "new_message";

/// Someone commented on a ticket the recipient has a stake in.
pub const NOTIFICATION_NEW_COMMENT: &str = "new_comment";

/// All valid notification types.
pub const VALID_NOTIFICATION_TYPES: &[&str] = &[
    NOTIFICATION_NEW_TICKET,
    NOTIFICATION_STATUS_CHANGE,
    NOTIFICATION_NEW_MESSAGE,
    NOTIFICATION_NEW_COMMENT,
];

/// Live event carrying a freshly persisted notification row.
pub const EVENT_NEW_NOTIFICATION: &str = "newNotification";

/// Live event carrying a freshly persisted direct message.
pub const EVENT_NEW_MESSAGE: &str = "newMessage";

/// Live event telling a sender that the recipient opened the conversation.
pub const EVENT_MESSAGES_READ: &str = "messagesRead";

/// Name of the live channel group a user's connections belong to.
pub fn user_group(user_id: DbId) -> String {
    format!("user:{user_id}")
}

/// Returns `true` if `kind` is a known notification type.
pub fn is_valid_notification_type(kind: &str) -> bool {
    VALID_NOTIFICATION_TYPES.contains(&kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_group_uses_prefix() {
        assert_eq!(user_group(42), "user:42");
    }

    #[test]
    fn notification_types_are_known() {
        for kind in VALID_NOTIFICATION_TYPES {
            assert!(is_valid_notification_type(kind));
        }
        assert!(!is_valid_notification_type("digest"));
    }
}
