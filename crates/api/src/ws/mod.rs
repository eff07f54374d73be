//! Live channel over WebSocket.
//!
//! Provides the per-user connection registry, heartbeat monitoring, and the
//! HTTP upgrade handler used by Axum routes.

mod handler;
mod heartbeat;
pub mod manager;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::{LiveFrame, WsManager};
