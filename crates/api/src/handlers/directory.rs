//! Read-only directory endpoints: departments, members, and the caller.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use helpdesk_core::error::CoreError;
use helpdesk_core::types::DbId;
use helpdesk_db::repositories::{DepartmentRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::actor::CurrentActor;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/departments
pub async fn list_departments(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let departments = DepartmentRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: departments }))
}

/// GET /api/v1/departments/{id}/members
pub async fn list_members(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(department_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if DepartmentRepo::find_by_id(&state.pool, department_id)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Department",
            id: department_id,
        }));
    }
    let members = UserRepo::list_by_department(&state.pool, department_id).await?;
    Ok(Json(DataResponse { data: members }))
}

/// GET /api/v1/users/me
pub async fn me(current: CurrentActor) -> AppResult<impl IntoResponse> {
    Ok(Json(DataResponse { data: current.user }))
}
