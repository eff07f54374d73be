use std::sync::Arc;

use helpdesk_events::EventBus;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone; everything shared lives behind an `Arc` or is a pool handle.
#[derive(Clone)]
pub struct AppState {
    pub pool: helpdesk_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Live channel registry (per-user WebSocket groups).
    pub ws_manager: Arc<WsManager>,
    /// Handlers publish here after a write commits; the notification router
    /// consumes.
    pub event_bus: Arc<EventBus>,
}
