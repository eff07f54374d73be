//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! Handlers publish a [`DomainEvent`] after their write has committed and
//! return immediately; the notification router consumes the events on its
//! own task. A slow or failing consumer therefore never affects the
//! request that caused the event.

use chrono::{DateTime, Utc};
use helpdesk_core::ticket::TicketStatus;
use helpdesk_core::types::DbId;
use helpdesk_db::models::message::Message;
use serde::Serialize;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// DomainEvent
// ---------------------------------------------------------------------------

/// Something that happened to a ticket or its conversations.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A ticket was opened.
    TicketCreated {
        ticket_id: DbId,
        title: String,
        actor_id: DbId,
        at: DateTime<Utc>,
    },

    /// A lifecycle transition was applied (claim, escalate, reassign, close).
    TicketStatusChanged {
        ticket_id: DbId,
        from: TicketStatus,
        to: TicketStatus,
        actor_id: DbId,
        at: DateTime<Utc>,
    },

    /// A comment was appended to a ticket.
    CommentAdded {
        ticket_id: DbId,
        comment_id: DbId,
        actor_id: DbId,
        at: DateTime<Utc>,
    },

    /// A direct message was persisted.
    MessageSent { message: Message, at: DateTime<Utc> },

    /// `reader_id` opened a conversation and acknowledged messages that
    /// `sender_id` had sent them.
    MessagesRead {
        ticket_id: DbId,
        reader_id: DbId,
        sender_id: DbId,
        message_ids: Vec<DbId>,
        at: DateTime<Utc>,
    },
}

impl DomainEvent {
    pub fn ticket_created(ticket_id: DbId, title: impl Into<String>, actor_id: DbId) -> Self {
        Self::TicketCreated {
            ticket_id,
            title: title.into(),
            actor_id,
            at: Utc::now(),
        }
    }

    pub fn status_changed(
        ticket_id: DbId,
        from: TicketStatus,
        to: TicketStatus,
        actor_id: DbId,
    ) -> Self {
        Self::TicketStatusChanged {
            ticket_id,
            from,
            to,
            actor_id,
            at: Utc::now(),
        }
    }

    pub fn comment_added(ticket_id: DbId, comment_id: DbId, actor_id: DbId) -> Self {
        Self::CommentAdded {
            ticket_id,
            comment_id,
            actor_id,
            at: Utc::now(),
        }
    }

    pub fn message_sent(message: Message) -> Self {
        Self::MessageSent {
            message,
            at: Utc::now(),
        }
    }

    pub fn messages_read(
        ticket_id: DbId,
        reader_id: DbId,
        sender_id: DbId,
        message_ids: Vec<DbId>,
    ) -> Self {
        Self::MessagesRead {
            ticket_id,
            reader_id,
            sender_id,
            message_ids,
            at: Utc::now(),
        }
    }

    /// Dot-separated name used in logs, e.g. `"ticket.status_changed"`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TicketCreated { .. } => "ticket.created",
            Self::TicketStatusChanged { .. } => "ticket.status_changed",
            Self::CommentAdded { .. } => "comment.added",
            Self::MessageSent { .. } => "message.sent",
            Self::MessagesRead { .. } => "message.read",
        }
    }

    /// The ticket the event concerns.
    pub fn ticket_id(&self) -> DbId {
        match self {
            Self::TicketCreated { ticket_id, .. }
            | Self::TicketStatusChanged { ticket_id, .. }
            | Self::CommentAdded { ticket_id, .. }
            | Self::MessagesRead { ticket_id, .. } => *ticket_id,
            Self::MessageSent { message, .. } => message.ticket_id,
        }
    }

    /// The user whose action produced the event.
    pub fn actor_id(&self) -> DbId {
        match self {
            Self::TicketCreated { actor_id, .. }
            | Self::TicketStatusChanged { actor_id, .. }
            | Self::CommentAdded { actor_id, .. } => *actor_id,
            Self::MessageSent { message, .. } => message.sender_id,
            Self::MessagesRead { reader_id, .. } => *reader_id,
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus, shared as `Arc<EventBus>`.
///
/// ```rust
/// use helpdesk_events::bus::{DomainEvent, EventBus};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(DomainEvent::comment_added(1, 2, 3));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed events are dropped and
    /// slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is dropped.
    pub fn publish(&self, event: DomainEvent) {
        tracing::debug!(
            event = event.name(),
            ticket_id = event.ticket_id(),
            actor_id = event.actor_id(),
            "Publishing domain event",
        );
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
