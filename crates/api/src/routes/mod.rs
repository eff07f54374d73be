pub mod comments;
pub mod directory;
pub mod health;
pub mod messages;
pub mod notification;
pub mod tickets;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /ws                                  live channel (token query param)
///
/// /tickets                             list, create
/// /tickets/{id}                        get, delete (admin)
/// /tickets/{id}/claim|escalate|reassign|close|status
/// /tickets/{id}/stakeholders
/// /tickets/{id}/comments               list, add
/// /tickets/{id}/messages               list mine, send
/// /tickets/{id}/messages/{other}       conversation (marks read)
/// /tickets/{id}/messages/{other}/read  bulk mark read
///
/// /comments/{id}                       delete (author)
/// /messages/unread-count
/// /messages/{id}/read
///
/// /notifications                       list
/// /notifications/read-all
/// /notifications/unread-count
/// /notifications/{id}/read
///
/// /departments                         list
/// /departments/{id}/members
/// /users/me
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/tickets", tickets::router())
        .nest("/comments", comments::router())
        .nest("/messages", messages::router())
        .nest("/notifications", notification::router())
        .nest("/departments", directory::departments_router())
        .nest("/users", directory::users_router())
}
