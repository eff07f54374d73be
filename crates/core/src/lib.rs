//! Domain rules for the helpdesk ticket engine.
//!
//! Everything in this crate is pure: no database, no network. The db and api
//! crates load state, ask these modules whether an action is allowed, and
//! then perform the write.

pub mod channels;
pub mod collaboration;
pub mod error;
pub mod pagination;
pub mod stakeholders;
pub mod ticket;
pub mod types;
