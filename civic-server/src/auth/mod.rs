//! Authentication
//!
//! Bearer JWT verification into an [`Actor`](shared::models::Actor):
//! - [`JwtService`] - token signing and validation
//! - [`CurrentUser`] - axum extractor for the authenticated caller

pub mod extractor;
pub mod jwt;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
