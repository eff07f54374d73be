//! Notification fanout.
//!
//! - [`stakeholders`] resolves who cares about a ticket against the store.
//! - [`NotificationFanout`] persists one notification per recipient and
//!   pushes it live.
//! - [`NotificationRouter`] consumes bus events and decides which fanout
//!   and live pushes each one triggers.

pub mod fanout;
pub mod router;
pub mod stakeholders;

pub use fanout::NotificationFanout;
pub use router::NotificationRouter;
