pub mod comments;
pub mod directory;
pub mod messages;
pub mod notification;
pub mod tickets;
