//! Route definitions for the `/messages` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::messages;
use crate::state::AppState;

/// Routes mounted at `/messages`.
///
/// ```text
/// GET    /unread-count   -> unread_count
/// POST   /{id}/read      -> mark_message_read
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/unread-count", get(messages::unread_count))
        .route("/{id}/read", post(messages::mark_message_read))
}
