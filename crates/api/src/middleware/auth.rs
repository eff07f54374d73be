//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use helpdesk_core::error::CoreError;
use helpdesk_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from a JWT.
///
/// The token is read from `Authorization: Bearer <token>`, falling back to a
/// `token` query parameter for the WebSocket upgrade (browsers cannot set
/// headers on it).
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    /// Admin flag carried by the token.
    pub is_admin: bool,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let claims = validate_token(&token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            is_admin: claims.is_admin,
        })
    }
}

fn bearer_token(parts: &Parts) -> Result<String, AppError> {
    if let Some(header) = parts.headers.get("authorization") {
        let value = header.to_str().unwrap_or_default();
        return value
            .strip_prefix("Bearer ")
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Invalid Authorization format. Expected: Bearer <token>".into(),
                ))
            });
    }

    parts
        .uri
        .query()
        .and_then(|query| {
            query
                .split('&')
                .filter_map(|pair| pair.split_once('='))
                .find(|(key, _)| *key == "token")
                .map(|(_, value)| value.to_string())
        })
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Missing Authorization header".into(),
            ))
        })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use axum::http::Request;

    use super::*;

    fn parts(uri: &str, auth: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = auth {
            builder = builder.header("authorization", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn reads_bearer_header() {
        let p = parts("/api/v1/tickets", Some("Bearer abc.def"));
        assert_eq!(bearer_token(&p).unwrap(), "abc.def");
    }

    #[test]
    fn rejects_non_bearer_scheme() {
        let p = parts("/api/v1/tickets", Some("Basic Zm9v"));
        assert_matches!(
            bearer_token(&p),
            Err(AppError::Core(CoreError::Unauthorized(_)))
        );
    }

    #[test]
    fn falls_back_to_query_token() {
        let p = parts("/api/v1/ws?foo=1&token=xyz", None);
        assert_eq!(bearer_token(&p).unwrap(), "xyz");
    }

    #[test]
    fn missing_credentials_is_unauthorized() {
        let p = parts("/api/v1/ws?token=", None);
        assert_matches!(
            bearer_token(&p),
            Err(AppError::Core(CoreError::Unauthorized(_)))
        );
    }
}
