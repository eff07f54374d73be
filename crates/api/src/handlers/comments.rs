//! Handlers for ticket comments.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use helpdesk_core::collaboration;
use helpdesk_core::error::CoreError;
use helpdesk_core::types::DbId;
use helpdesk_db::models::comment::CreateComment;
use helpdesk_db::repositories::{CommentRepo, TicketRepo};
use helpdesk_events::DomainEvent;

use crate::error::{AppError, AppResult};
use crate::extract::ValidJson;
use crate::handlers::tickets::ensure_visible;
use crate::middleware::actor::CurrentActor;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

fn ticket_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Ticket",
        id,
    })
}

// ---------------------------------------------------------------------------
// POST /tickets/{id}/comments
// ---------------------------------------------------------------------------

/// Append a comment. Allowed for the creator, the assignee, and admins of
/// the destination department.
pub async fn add_comment(
    current: CurrentActor,
    State(state): State<AppState>,
    Path(ticket_id): Path<DbId>,
    ValidJson(input): ValidJson<CreateComment>,
) -> AppResult<impl IntoResponse> {
    let content = collaboration::validate_content(&input.content)?;

    let ticket = TicketRepo::find_by_id(&state.pool, ticket_id)
        .await?
        .ok_or_else(|| ticket_not_found(ticket_id))?;
    if !collaboration::can_comment(&ticket.parties()?, &current.actor) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the creator, the assignee or a destination department admin can comment".into(),
        )));
    }

    let comment = CommentRepo::create(&state.pool, ticket_id, current.id(), &content).await?;

    tracing::info!(
        comment_id = comment.id,
        ticket_id,
        user_id = current.id(),
        "Comment added",
    );
    state.event_bus.publish(DomainEvent::comment_added(
        ticket_id,
        comment.id,
        current.id(),
    ));

    Ok((StatusCode::CREATED, Json(DataResponse { data: comment })))
}

// ---------------------------------------------------------------------------
// GET /tickets/{id}/comments
// ---------------------------------------------------------------------------

pub async fn list_comments(
    current: CurrentActor,
    State(state): State<AppState>,
    Path(ticket_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let ticket = TicketRepo::find_by_id(&state.pool, ticket_id)
        .await?
        .ok_or_else(|| ticket_not_found(ticket_id))?;
    ensure_visible(&ticket, &current)?;

    let comments = CommentRepo::list_for_ticket(&state.pool, ticket_id).await?;
    Ok(Json(DataResponse { data: comments }))
}

// ---------------------------------------------------------------------------
// DELETE /comments/{id}
// ---------------------------------------------------------------------------

/// Delete a comment. Only its author may, whatever their role on the ticket.
pub async fn delete_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let not_found = || {
        AppError::Core(CoreError::NotFound {
            entity: "Comment",
            id: comment_id,
        })
    };

    let comment = CommentRepo::find_by_id(&state.pool, comment_id)
        .await?
        .ok_or_else(not_found)?;
    if comment.user_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the author can delete a comment".into(),
        )));
    }

    if !CommentRepo::delete_by_author(&state.pool, comment_id, auth.user_id).await? {
        return Err(not_found());
    }

    tracing::info!(comment_id, user_id = auth.user_id, "Comment deleted");
    Ok(StatusCode::NO_CONTENT)
}
