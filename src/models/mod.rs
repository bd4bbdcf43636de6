//! Data models for Athenaeum

pub mod author;
pub mod book;
pub mod notification;
pub mod user;

// Re-export commonly used types
pub use author::Author;
pub use book::{Book, BookSummary};
pub use notification::Notification;
pub use user::{Role, User, UserClaims, UserSummary};
