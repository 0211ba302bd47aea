//! Data models
//!
//! Entity records persisted by the server and returned through the API.
//! All IDs are 24-hex strings (see [`crate::util::new_id`]) and all
//! timestamps are ISO-8601 strings. JSON field names are camelCase.

pub mod actor;
pub mod analytics;
pub mod incident;
pub mod message;
pub mod password_reset;
pub mod ticket;
pub mod user;

// Re-exports
pub use actor::*;
pub use analytics::*;
pub use incident::*;
pub use message::*;
pub use password_reset::*;
pub use ticket::*;
pub use user::*;
