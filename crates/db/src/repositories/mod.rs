//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod comment_repo;
pub mod department_repo;
pub mod message_repo;
pub mod notification_repo;
pub mod ticket_repo;
pub mod user_repo;

pub use comment_repo::CommentRepo;
pub use department_repo::DepartmentRepo;
pub use message_repo::MessageRepo;
pub use notification_repo::NotificationRepo;
pub use ticket_repo::{NewTicket, TicketRepo};
pub use user_repo::UserRepo;
