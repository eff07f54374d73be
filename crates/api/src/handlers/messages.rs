//! Handlers for direct messages between users about a ticket.
//!
//! Whether two users may talk is decided at send time from the ticket's
//! current state. History stays readable to its participants after the
//! relation lapses.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use helpdesk_core::collaboration;
use helpdesk_core::error::CoreError;
use helpdesk_core::types::DbId;
use helpdesk_db::models::message::SendMessage;
use helpdesk_db::repositories::{MessageRepo, TicketRepo, UserRepo};
use helpdesk_db::DbPool;
use helpdesk_events::DomainEvent;

use crate::error::{AppError, AppResult};
use crate::extract::ValidJson;
use crate::middleware::actor::CurrentActor;
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, MarkedRead, UnreadCount};
use crate::state::AppState;

async fn ensure_ticket_exists(pool: &DbPool, ticket_id: DbId) -> AppResult<()> {
    match TicketRepo::find_by_id(pool, ticket_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::Core(CoreError::NotFound {
            entity: "Ticket",
            id: ticket_id,
        })),
    }
}

/// Mark everything `other_user_id` sent the reader on this ticket as read
/// and, if anything changed, tell the sender.
async fn acknowledge(
    state: &AppState,
    ticket_id: DbId,
    reader_id: DbId,
    other_user_id: DbId,
) -> AppResult<u64> {
    let ids =
        MessageRepo::mark_conversation_read(&state.pool, ticket_id, other_user_id, reader_id)
            .await?;
    let count = ids.len() as u64;
    if !ids.is_empty() {
        tracing::debug!(ticket_id, reader_id, other_user_id, count, "Messages acknowledged");
        state.event_bus.publish(DomainEvent::messages_read(
            ticket_id,
            reader_id,
            other_user_id,
            ids,
        ));
    }
    Ok(count)
}

// ---------------------------------------------------------------------------
// POST /tickets/{id}/messages
// ---------------------------------------------------------------------------

pub async fn send_message(
    current: CurrentActor,
    State(state): State<AppState>,
    Path(ticket_id): Path<DbId>,
    ValidJson(input): ValidJson<SendMessage>,
) -> AppResult<impl IntoResponse> {
    let content = collaboration::validate_content(&input.content)?;
    if input.recipient_id == current.id() {
        return Err(AppError::Core(CoreError::Validation(
            "Cannot send a message to yourself".into(),
        )));
    }

    let ticket = TicketRepo::find_by_id(&state.pool, ticket_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Ticket",
            id: ticket_id,
        }))?;
    let recipient = UserRepo::find_by_id(&state.pool, input.recipient_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: input.recipient_id,
        }))?;

    let parties = ticket.parties()?;
    if !collaboration::can_message(&parties, &current.actor, &recipient.as_actor()) {
        return Err(AppError::Core(CoreError::RelationDenied(format!(
            "You cannot message user {} about ticket {ticket_id}",
            recipient.id
        ))));
    }

    let message =
        MessageRepo::create(&state.pool, ticket_id, current.id(), recipient.id, &content).await?;

    tracing::info!(
        message_id = message.id,
        ticket_id,
        sender_id = current.id(),
        recipient_id = recipient.id,
        "Message sent",
    );

    state
        .event_bus
        .publish(DomainEvent::message_sent(message.clone()));

    Ok((StatusCode::CREATED, Json(DataResponse { data: message })))
}

// ---------------------------------------------------------------------------
// GET /tickets/{id}/messages
// ---------------------------------------------------------------------------

/// Every message on the ticket the caller sent or received.
pub async fn list_my_messages(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(ticket_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_ticket_exists(&state.pool, ticket_id).await?;
    let messages =
        MessageRepo::list_for_user_on_ticket(&state.pool, ticket_id, auth.user_id).await?;
    Ok(Json(DataResponse { data: messages }))
}

// ---------------------------------------------------------------------------
// GET /tickets/{id}/messages/{other_user_id}
// ---------------------------------------------------------------------------

/// The conversation between the caller and `other_user_id`, oldest first.
///
/// Opening it acknowledges every message the other user sent the caller.
pub async fn get_conversation(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((ticket_id, other_user_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    ensure_ticket_exists(&state.pool, ticket_id).await?;
    acknowledge(&state, ticket_id, auth.user_id, other_user_id).await?;

    let messages =
        MessageRepo::conversation(&state.pool, ticket_id, auth.user_id, other_user_id).await?;
    Ok(Json(DataResponse { data: messages }))
}

// ---------------------------------------------------------------------------
// POST /tickets/{id}/messages/{other_user_id}/read
// ---------------------------------------------------------------------------

pub async fn mark_conversation_read(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((ticket_id, other_user_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    ensure_ticket_exists(&state.pool, ticket_id).await?;
    let marked_read = acknowledge(&state, ticket_id, auth.user_id, other_user_id).await?;
    Ok(Json(DataResponse {
        data: MarkedRead { marked_read },
    }))
}

// ---------------------------------------------------------------------------
// POST /messages/{id}/read
// ---------------------------------------------------------------------------

/// Mark one message read. Only its recipient may; repeating is harmless.
pub async fn mark_message_read(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(message_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let message = MessageRepo::mark_read(&state.pool, message_id, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Message",
            id: message_id,
        }))?;
    Ok(Json(DataResponse { data: message }))
}

// ---------------------------------------------------------------------------
// GET /messages/unread-count
// ---------------------------------------------------------------------------

pub async fn unread_count(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let count = MessageRepo::unread_count(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: UnreadCount { count },
    }))
}
