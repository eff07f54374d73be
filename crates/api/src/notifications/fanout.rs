//! Durable-then-live notification delivery.
//!
//! Each notification is written first and pushed second. The two paths are
//! independent: a recipient with no live connection still finds the row on
//! their next pull, and a failed insert for one recipient is logged and
//! skipped without touching the others.

use std::sync::Arc;

use helpdesk_core::channels::EVENT_NEW_NOTIFICATION;
use helpdesk_core::types::DbId;
use helpdesk_db::models::notification::{CreateNotification, Notification};
use helpdesk_db::repositories::{NotificationRepo, UserRepo};
use helpdesk_db::DbPool;
use helpdesk_events::{EmailDelivery, NotificationEmail};

use crate::error::AppResult;
use crate::notifications::stakeholders;
use crate::ws::WsManager;

/// Persists notifications and pushes them to connected recipients.
#[derive(Clone)]
pub struct NotificationFanout {
    pool: DbPool,
    ws_manager: Arc<WsManager>,
    email: Option<Arc<EmailDelivery>>,
}

impl NotificationFanout {
    pub fn new(pool: DbPool, ws_manager: Arc<WsManager>) -> Self {
        Self {
            pool,
            ws_manager,
            email: None,
        }
    }

    /// Also email every persisted notification.
    pub fn with_email(mut self, email: Arc<EmailDelivery>) -> Self {
        self.email = Some(email);
        self
    }

    /// Notify every stakeholder of `ticket_id` except `excluded_actor`.
    ///
    /// Returns the notifications that were persisted. Recipients whose
    /// insert failed are absent from the result.
    pub async fn notify_ticket_event(
        &self,
        ticket_id: DbId,
        excluded_actor: Option<DbId>,
        message: &str,
        notification_type: &'static str,
        metadata: serde_json::Value,
    ) -> AppResult<Vec<Notification>> {
        let recipients = stakeholders::recipients(&self.pool, ticket_id, excluded_actor).await?;

        let mut created = Vec::with_capacity(recipients.len());
        for user_id in recipients {
            let input = CreateNotification {
                user_id,
                ticket_id,
                message: message.to_string(),
                notification_type,
                metadata: metadata.clone(),
            };
            if let Some(notification) = self.deliver(input).await {
                created.push(notification);
            }
        }

        tracing::info!(
            ticket_id,
            notification_type,
            delivered = created.len(),
            "Ticket event fanned out",
        );
        Ok(created)
    }

    /// Notify exactly one user, bypassing stakeholder resolution.
    pub async fn notify_user(
        &self,
        user_id: DbId,
        ticket_id: DbId,
        message: &str,
        notification_type: &'static str,
        metadata: serde_json::Value,
    ) -> Option<Notification> {
        self.deliver(CreateNotification {
            user_id,
            ticket_id,
            message: message.to_string(),
            notification_type,
            metadata,
        })
        .await
    }

    async fn deliver(&self, input: CreateNotification) -> Option<Notification> {
        let notification = match NotificationRepo::create(&self.pool, &input).await {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    user_id = input.user_id,
                    ticket_id = input.ticket_id,
                    notification_type = input.notification_type,
                    "Failed to persist notification, skipping recipient",
                );
                return None;
            }
        };

        match serde_json::to_value(&notification) {
            Ok(payload) => {
                self.ws_manager
                    .publish(notification.user_id, EVENT_NEW_NOTIFICATION, payload)
                    .await;
            }
            Err(e) => {
                tracing::error!(error = %e, notification_id = notification.id, "Failed to encode notification");
            }
        }

        if let Some(email) = &self.email {
            self.spawn_email(Arc::clone(email), &notification);
        }

        Some(notification)
    }

    fn spawn_email(&self, email: Arc<EmailDelivery>, notification: &Notification) {
        let pool = self.pool.clone();
        let user_id = notification.user_id;
        let ticket_id = notification.ticket_id;
        let notification_type = notification.notification_type.clone();
        let message = notification.message.clone();

        tokio::spawn(async move {
            let to = match UserRepo::find_by_id(&pool, user_id).await {
                Ok(Some(user)) => user.email,
                Ok(None) => return,
                Err(e) => {
                    tracing::warn!(error = %e, user_id, "Email skipped, recipient lookup failed");
                    return;
                }
            };
            let mail = NotificationEmail {
                to,
                ticket_id,
                notification_type,
                message,
            };
            if let Err(e) = email.deliver(&mail).await {
                tracing::warn!(error = %e, user_id, ticket_id, "Notification email failed");
            }
        });
    }
}
