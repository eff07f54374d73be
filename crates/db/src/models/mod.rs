//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` request DTOs for the operations on that entity

pub mod comment;
pub mod department;
pub mod message;
pub mod notification;
pub mod ticket;
pub mod user;
