//! Core - configuration, shared state and the HTTP server
//!
//! - [`Config`] - environment configuration
//! - [`ServerState`] - services shared by every handler
//! - [`Server`] - listener and router wiring
//! - [`ServerError`] - start-up failures

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::Config;
pub use error::{Result, ServerError};
pub use server::{Server, build_router};
pub use state::ServerState;
