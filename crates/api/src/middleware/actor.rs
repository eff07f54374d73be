//! Directory-backed actor extractor.
//!
//! Department membership and the admin flag can change after a token is
//! issued, and every lifecycle guard depends on them, so handlers that make
//! permission decisions resolve the caller against `users` on each request.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use helpdesk_core::error::CoreError;
use helpdesk_core::ticket::Actor;
use helpdesk_db::models::user::User;
use helpdesk_db::repositories::UserRepo;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// The authenticated caller as the directory currently sees them.
#[derive(Debug, Clone)]
pub struct CurrentActor {
    pub user: User,
    pub actor: Actor,
}

impl CurrentActor {
    pub fn id(&self) -> helpdesk_core::types::DbId {
        self.actor.user_id
    }
}

impl FromRequestParts<AppState> for CurrentActor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        let user = UserRepo::find_by_id(&state.pool, auth.user_id)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Token subject no longer exists".into(),
                ))
            })?;

        Ok(CurrentActor {
            actor: user.as_actor(),
            user,
        })
    }
}
