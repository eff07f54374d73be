//! Route definitions for the `/tickets` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{comments, messages, tickets};
use crate::state::AppState;

/// Routes mounted at `/tickets`.
///
/// ```text
/// GET    /                                    -> list_tickets
/// POST   /                                    -> create_ticket
/// GET    /{id}                                -> get_ticket
/// DELETE /{id}                                -> delete_ticket (admin)
/// POST   /{id}/claim                          -> claim_ticket
/// POST   /{id}/escalate                       -> escalate_ticket
/// POST   /{id}/reassign                       -> reassign_ticket
/// POST   /{id}/close                          -> close_ticket
/// PUT    /{id}/status                         -> update_status
/// GET    /{id}/stakeholders                   -> list_stakeholders
/// GET    /{id}/comments                       -> list_comments
/// POST   /{id}/comments                       -> add_comment
/// GET    /{id}/messages                       -> list_my_messages
/// POST   /{id}/messages                       -> send_message
/// GET    /{id}/messages/{other_user_id}       -> get_conversation
/// POST   /{id}/messages/{other_user_id}/read  -> mark_conversation_read
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tickets::list_tickets).post(tickets::create_ticket))
        .route(
            "/{id}",
            get(tickets::get_ticket).delete(tickets::delete_ticket),
        )
        // Lifecycle
        .route("/{id}/claim", post(tickets::claim_ticket))
        .route("/{id}/escalate", post(tickets::escalate_ticket))
        .route("/{id}/reassign", post(tickets::reassign_ticket))
        .route("/{id}/close", post(tickets::close_ticket))
        .route("/{id}/status", put(tickets::update_status))
        .route("/{id}/stakeholders", get(tickets::list_stakeholders))
        // Collaboration
        .route(
            "/{id}/comments",
            get(comments::list_comments).post(comments::add_comment),
        )
        .route(
            "/{id}/messages",
            get(messages::list_my_messages).post(messages::send_message),
        )
        .route(
            "/{id}/messages/{other_user_id}",
            get(messages::get_conversation),
        )
        .route(
            "/{id}/messages/{other_user_id}/read",
            post(messages::mark_conversation_read),
        )
}
