//! Per-user live channel registry.
//!
//! Every authenticated socket is registered under its user's group
//! (`user:{id}`). Publishing to a user walks that user's connections and
//! enqueues one JSON text frame on each. The registry is process-local and
//! rebuilt as clients reconnect; nothing is queued for offline users.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use helpdesk_core::channels::user_group;
use helpdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing frames to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Wire shape of every pushed frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LiveFrame {
    pub event: String,
    pub payload: serde_json::Value,
}

/// Metadata for a single WebSocket connection.
pub struct WsConnection {
    pub user_id: DbId,
    /// Outbound queue; order of sends is the order the client sees.
    pub sender: WsSender,
    pub connected_at: Timestamp,
}

/// Manages all live connections, grouped by user.
///
/// Thread-safe via interior `RwLock`; wrapped in `Arc` and shared across the
/// application.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Add a connection to `user_id`'s group.
    ///
    /// Returns the receiver half of the outbound queue so the caller can
    /// forward frames to the WebSocket sink.
    pub async fn subscribe(
        &self,
        conn_id: String,
        user_id: DbId,
    ) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            user_id,
            sender: tx,
            connected_at: chrono::Utc::now(),
        };
        self.connections.write().await.insert(conn_id.clone(), conn);
        tracing::debug!(conn_id = %conn_id, group = %user_group(user_id), "Joined live group");
        rx
    }

    /// Remove a connection on disconnect. Unknown ids are ignored.
    pub async fn unsubscribe(&self, conn_id: &str) {
        if let Some(conn) = self.connections.write().await.remove(conn_id) {
            tracing::debug!(
                conn_id = %conn_id,
                group = %user_group(conn.user_id),
                connected_secs = (chrono::Utc::now() - conn.connected_at).num_seconds(),
                "Left live group",
            );
        }
    }

    /// Connection ids currently in `user_id`'s group.
    pub async fn connections_for(&self, user_id: DbId) -> Vec<String> {
        self.connections
            .read()
            .await
            .iter()
            .filter(|(_, conn)| conn.user_id == user_id)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Deliver `{ event, payload }` to every live connection of `user_id`.
    ///
    /// Returns how many connections accepted the frame. An empty group is a
    /// no-op returning 0. Connections whose queues are closed are skipped;
    /// their receive loop removes them.
    pub async fn publish(&self, user_id: DbId, event: &str, payload: serde_json::Value) -> usize {
        let frame = LiveFrame {
            event: event.to_string(),
            payload,
        };
        let text = match serde_json::to_string(&frame) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, event, "Failed to serialize live frame");
                return 0;
            }
        };
        let message = Message::Text(text.into());

        let conns = self.connections.read().await;
        let delivered = conns
            .values()
            .filter(|conn| conn.user_id == user_id)
            .filter(|conn| conn.sender.send(message.clone()).is_ok())
            .count();

        tracing::trace!(user_id, event, delivered, "Live push");
        delivered
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Send a Close frame to every connection, then clear the registry.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}
