//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`]: the authenticated user id from a JWT.
//! - [`actor::CurrentActor`]: the authenticated user resolved against the
//!   directory (current department and admin flag).
//! - [`rbac::RequireAdmin`]: requires an admin.

pub mod actor;
pub mod auth;
pub mod rbac;
