//! Event-to-notification routing.
//!
//! [`NotificationRouter`] subscribes to the event bus and turns each
//! [`DomainEvent`] into durable notifications and live pushes.

use std::sync::Arc;

use helpdesk_core::channels::{
    EVENT_MESSAGES_READ, EVENT_NEW_MESSAGE, NOTIFICATION_NEW_COMMENT, NOTIFICATION_NEW_MESSAGE,
    NOTIFICATION_NEW_TICKET, NOTIFICATION_STATUS_CHANGE,
};
use helpdesk_events::DomainEvent;
use serde_json::json;
use tokio::sync::broadcast;

use crate::error::{AppError, AppResult};
use crate::notifications::NotificationFanout;
use crate::ws::WsManager;

/// Routes bus events to stakeholders.
pub struct NotificationRouter {
    fanout: NotificationFanout,
    ws_manager: Arc<WsManager>,
}

impl NotificationRouter {
    pub fn new(fanout: NotificationFanout, ws_manager: Arc<WsManager>) -> Self {
        Self { fanout, ws_manager }
    }

    /// Run the routing loop until the bus is dropped.
    ///
    /// A routing failure is logged and the loop moves on to the next event.
    pub async fn run(self, mut receiver: broadcast::Receiver<DomainEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.route_event(&event).await {
                        tracing::error!(
                            error = %e,
                            event = event.name(),
                            ticket_id = event.ticket_id(),
                            "Failed to route event",
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Route a single event.
    pub async fn route_event(&self, event: &DomainEvent) -> AppResult<()> {
        match event {
            DomainEvent::TicketCreated {
                ticket_id,
                title,
                actor_id,
                ..
            } => {
                self.fanout
                    .notify_ticket_event(
                        *ticket_id,
                        Some(*actor_id),
                        &format!("New ticket #{ticket_id}: {title}"),
                        NOTIFICATION_NEW_TICKET,
                        json!({ "ticket_id": ticket_id }),
                    )
                    .await?;
            }

            DomainEvent::TicketStatusChanged {
                ticket_id,
                from,
                to,
                actor_id,
                ..
            } => {
                self.fanout
                    .notify_ticket_event(
                        *ticket_id,
                        Some(*actor_id),
                        &format!("Ticket #{ticket_id} moved from {from} to {to}"),
                        NOTIFICATION_STATUS_CHANGE,
                        json!({ "from": from, "to": to }),
                    )
                    .await?;
            }

            DomainEvent::CommentAdded {
                ticket_id,
                comment_id,
                actor_id,
                ..
            } => {
                self.fanout
                    .notify_ticket_event(
                        *ticket_id,
                        Some(*actor_id),
                        &format!("New comment on ticket #{ticket_id}"),
                        NOTIFICATION_NEW_COMMENT,
                        json!({ "comment_id": comment_id }),
                    )
                    .await?;
            }

            DomainEvent::MessageSent { message, .. } => {
                let payload = serde_json::to_value(message)
                    .map_err(|e| AppError::InternalError(e.to_string()))?;
                self.ws_manager
                    .publish(message.recipient_id, EVENT_NEW_MESSAGE, payload)
                    .await;

                self.fanout
                    .notify_user(
                        message.recipient_id,
                        message.ticket_id,
                        &format!("New message on ticket #{}", message.ticket_id),
                        NOTIFICATION_NEW_MESSAGE,
                        json!({ "message_id": message.id, "sender_id": message.sender_id }),
                    )
                    .await;
            }

            DomainEvent::MessagesRead {
                ticket_id,
                reader_id,
                sender_id,
                message_ids,
                ..
            } => {
                self.ws_manager
                    .publish(
                        *sender_id,
                        EVENT_MESSAGES_READ,
                        json!({
                            "ticket_id": ticket_id,
                            "reader_id": reader_id,
                            "message_ids": message_ids,
                        }),
                    )
                    .await;
            }
        }
        Ok(())
    }
}
