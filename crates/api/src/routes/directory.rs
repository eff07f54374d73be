use axum::routing::get;
use axum::Router;

use crate::handlers::directory;
use crate::state::AppState;

/// Routes mounted at `/departments`.
pub fn departments_router() -> Router<AppState> {
    Router::new()
        .route("/", get(directory::list_departments))
        .route("/{id}/members", get(directory::list_members))
}

/// Routes mounted at `/users`.
pub fn users_router() -> Router<AppState> {
    Router::new().route("/me", get(directory::me))
}
