//! Civic Server - incident reporting and ticket resolution service
//!
//! # Module layout
//!
//! ```text
//! civic-server/src/
//! ├── core/          # configuration, state, errors, HTTP server
//! ├── auth/          # JWT verification, request extractor
//! ├── db/            # redb document store and repositories
//! ├── services/      # incident/ticket lifecycle, recipients, password reset
//! ├── notify/        # email, SMS and WhatsApp dispatch
//! ├── live/          # dashboard broadcast hub
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # logging, phone and text helpers
//! ```
//!
//! A new incident flows through [`services::IncidentService::create`]:
//! persist, derive the ticket, broadcast, then alert stakeholders.
//! Ticket mutations go through [`services::TicketService`] and are mirrored
//! back onto the incident before notifications go out.

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod live;
pub mod notify;
pub mod services;
pub mod utils;

pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState, build_router};
pub use live::LiveHub;
pub use utils::{AppError, AppResult, ErrorCode};

pub use utils::logger::{init_logger, init_logger_with_file};
