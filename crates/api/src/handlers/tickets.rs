//! Handlers for the `/tickets` resource and its lifecycle transitions.
//!
//! Every transition follows the same shape: load the ticket, run the pure
//! guard from `helpdesk_core::ticket`, then apply a conditional `UPDATE`
//! that restates the guard's preconditions. If the update matches nothing
//! another request won the race; the fresh row is re-checked so the caller
//! gets the error that describes the ticket as it is now.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use helpdesk_core::error::CoreError;
use helpdesk_core::pagination::{clamp_limit, clamp_offset};
use helpdesk_core::ticket::{self, TicketParties, TicketStatus};
use helpdesk_core::types::DbId;
use helpdesk_db::models::ticket::{
    CreateTicket, EscalateTicket, ReassignTicket, Ticket, TicketListParams, UpdateTicketStatus,
};
use helpdesk_db::repositories::{DepartmentRepo, NewTicket, TicketRepo, UserRepo};
use helpdesk_db::DbPool;
use helpdesk_events::DomainEvent;

use crate::error::{AppError, AppResult};
use crate::extract::ValidJson;
use crate::middleware::actor::CurrentActor;
use crate::middleware::rbac::RequireAdmin;
use crate::notifications::stakeholders;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_ticket(pool: &DbPool, id: DbId) -> AppResult<Ticket> {
    TicketRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Ticket",
            id,
        }))
}

/// Explain why a conditional update matched no row.
async fn lost_race(
    pool: &DbPool,
    id: DbId,
    check: impl Fn(&TicketParties) -> Result<(), CoreError>,
) -> AppError {
    let fresh = match load_ticket(pool, id).await {
        Ok(ticket) => ticket,
        Err(e) => return e,
    };
    let parties = match fresh.parties() {
        Ok(parties) => parties,
        Err(e) => return e.into(),
    };
    match check(&parties) {
        Err(e) => e.into(),
        Ok(()) => AppError::Core(CoreError::InvalidState(format!(
            "Ticket {id} was modified concurrently; reload and retry"
        ))),
    }
}

fn announce_transition(state: &AppState, from: TicketStatus, updated: &Ticket, actor_id: DbId) {
    match updated.status() {
        Ok(to) => state
            .event_bus
            .publish(DomainEvent::status_changed(updated.id, from, to, actor_id)),
        Err(e) => tracing::error!(error = %e, ticket_id = updated.id, "Transition not announced"),
    }
}

// ---------------------------------------------------------------------------
// POST /tickets
// ---------------------------------------------------------------------------

/// Open a ticket from the caller's department to `destination_department_id`.
pub async fn create_ticket(
    current: CurrentActor,
    State(state): State<AppState>,
    ValidJson(input): ValidJson<CreateTicket>,
) -> AppResult<impl IntoResponse> {
    let source_department_id = ticket::source_department_for(&current.actor)?;
    let title = ticket::validate_title(&input.title)?;
    let description = ticket::validate_description(&input.description)?;

    if DepartmentRepo::find_by_id(&state.pool, input.destination_department_id)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Department",
            id: input.destination_department_id,
        }));
    }

    let created = TicketRepo::create(
        &state.pool,
        &NewTicket {
            title: &title,
            description: &description,
            priority: input.priority,
            created_by: current.id(),
            source_department_id,
            destination_department_id: input.destination_department_id,
        },
    )
    .await?;

    tracing::info!(
        ticket_id = created.id,
        user_id = current.id(),
        source_department_id,
        destination_department_id = created.destination_department_id,
        "Ticket created",
    );

    state.event_bus.publish(DomainEvent::ticket_created(
        created.id,
        created.title.clone(),
        current.id(),
    ));

    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

// ---------------------------------------------------------------------------
// GET /tickets
// ---------------------------------------------------------------------------

/// List tickets created by, assigned to, or routed to the caller's department.
pub async fn list_tickets(
    current: CurrentActor,
    State(state): State<AppState>,
    Query(params): Query<TicketListParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit, 50, 200);
    let offset = clamp_offset(params.offset);

    let tickets = TicketRepo::list_scoped(
        &state.pool,
        params.scope,
        current.id(),
        current.actor.department_id,
        params.status,
        limit,
        offset,
    )
    .await?;

    Ok(Json(DataResponse { data: tickets }))
}

// ---------------------------------------------------------------------------
// GET /tickets/{id}
// ---------------------------------------------------------------------------

pub async fn get_ticket(
    current: CurrentActor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let found = load_ticket(&state.pool, id).await?;
    ensure_visible(&found, &current)?;
    Ok(Json(DataResponse { data: found }))
}

pub(crate) fn ensure_visible(found: &Ticket, current: &CurrentActor) -> AppResult<TicketParties> {
    let parties = found.parties()?;
    if !ticket::can_view(&parties, &current.actor) {
        return Err(AppError::Core(CoreError::Forbidden(
            "You are not related to this ticket".into(),
        )));
    }
    Ok(parties)
}

// ---------------------------------------------------------------------------
// GET /tickets/{id}/stakeholders
// ---------------------------------------------------------------------------

pub async fn list_stakeholders(
    current: CurrentActor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let found = load_ticket(&state.pool, id).await?;
    ensure_visible(&found, &current)?;

    let ids: Vec<DbId> = stakeholders::resolve(&state.pool, id)
        .await?
        .into_iter()
        .collect();
    Ok(Json(DataResponse { data: ids }))
}

// ---------------------------------------------------------------------------
// POST /tickets/{id}/claim
// ---------------------------------------------------------------------------

/// Take an open ticket routed to the caller's department.
pub async fn claim_ticket(
    current: CurrentActor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let parties = load_ticket(&state.pool, id).await?.parties()?;
    ticket::check_claim(&parties, &current.actor)?;

    let Some(updated) =
        TicketRepo::claim(&state.pool, id, current.id(), parties.destination_department_id)
            .await?
    else {
        return Err(lost_race(&state.pool, id, |p| ticket::check_claim(p, &current.actor)).await);
    };

    tracing::info!(ticket_id = id, user_id = current.id(), "Ticket claimed");
    announce_transition(&state, parties.status, &updated, current.id());

    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// POST /tickets/{id}/escalate
// ---------------------------------------------------------------------------

/// Hand an in-progress ticket up for admin review.
pub async fn escalate_ticket(
    current: CurrentActor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidJson(input): ValidJson<EscalateTicket>,
) -> AppResult<impl IntoResponse> {
    let parties = load_ticket(&state.pool, id).await?.parties()?;
    let reason = ticket::check_escalate(&parties, &current.actor, &input.reason)?;

    let Some(updated) = TicketRepo::escalate(&state.pool, id, current.id(), &reason).await?
    else {
        return Err(lost_race(&state.pool, id, |p| {
            ticket::check_escalate(p, &current.actor, &reason).map(|_| ())
        })
        .await);
    };

    tracing::info!(ticket_id = id, user_id = current.id(), "Ticket escalated");
    announce_transition(&state, parties.status, &updated, current.id());

    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// POST /tickets/{id}/reassign
// ---------------------------------------------------------------------------

/// Route an escalated ticket to a new assignee and department.
pub async fn reassign_ticket(
    current: CurrentActor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidJson(input): ValidJson<ReassignTicket>,
) -> AppResult<impl IntoResponse> {
    let parties = load_ticket(&state.pool, id).await?.parties()?;
    ticket::check_reassign(&parties, &current.actor)?;

    if UserRepo::find_by_id(&state.pool, input.assignee_id)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: input.assignee_id,
        }));
    }
    if DepartmentRepo::find_by_id(&state.pool, input.department_id)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Department",
            id: input.department_id,
        }));
    }

    let Some(updated) = TicketRepo::reassign(
        &state.pool,
        id,
        current.id(),
        parties.destination_department_id,
        input.assignee_id,
        input.department_id,
    )
    .await?
    else {
        return Err(lost_race(&state.pool, id, |p| ticket::check_reassign(p, &current.actor)).await);
    };

    tracing::info!(
        ticket_id = id,
        admin_id = current.id(),
        assignee_id = input.assignee_id,
        department_id = input.department_id,
        "Ticket reassigned",
    );
    announce_transition(&state, parties.status, &updated, current.id());

    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// POST /tickets/{id}/close
// ---------------------------------------------------------------------------

pub async fn close_ticket(
    current: CurrentActor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let parties = load_ticket(&state.pool, id).await?.parties()?;
    ticket::check_close(&parties, &current.actor)?;
    let updated = apply_close(&state, &parties, &current, |p| {
        ticket::check_close(p, &current.actor)
    })
    .await?;
    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// PUT /tickets/{id}/status
// ---------------------------------------------------------------------------

/// Generic status write. Gated like close; only `closed` is reachable here.
pub async fn update_status(
    current: CurrentActor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidJson(input): ValidJson<UpdateTicketStatus>,
) -> AppResult<impl IntoResponse> {
    let parties = load_ticket(&state.pool, id).await?.parties()?;
    ticket::check_set_status(&parties, &current.actor, input.status)?;
    let updated = apply_close(&state, &parties, &current, |p| {
        ticket::check_set_status(p, &current.actor, input.status)
    })
    .await?;
    Ok(Json(DataResponse { data: updated }))
}

async fn apply_close(
    state: &AppState,
    parties: &TicketParties,
    current: &CurrentActor,
    recheck: impl Fn(&TicketParties) -> Result<(), CoreError>,
) -> AppResult<Ticket> {
    let id = parties.ticket_id;
    let assignee = parties.assigned_to.ok_or_else(|| {
        CoreError::Internal(format!("ticket {id} is {} without an assignee", parties.status))
    })?;

    let Some(updated) =
        TicketRepo::close(&state.pool, id, current.id(), parties.status, assignee).await?
    else {
        return Err(lost_race(&state.pool, id, recheck).await);
    };

    tracing::info!(ticket_id = id, user_id = current.id(), "Ticket closed");
    announce_transition(state, parties.status, &updated, current.id());
    Ok(updated)
}

// ---------------------------------------------------------------------------
// DELETE /tickets/{id}
// ---------------------------------------------------------------------------

/// Hard delete. Messages, comments and notifications go with the ticket.
pub async fn delete_ticket(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = TicketRepo::delete(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Ticket",
            id,
        }))?;

    tracing::info!(ticket_id = id, admin_id = admin.user_id, "Ticket deleted");
    Ok(Json(DataResponse { data: deleted }))
}
