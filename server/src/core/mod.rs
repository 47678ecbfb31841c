//! Core module - infrastructure shared by every layer
//!
//! - Authentication: JWT, session cookie, token lookup
//! - Configuration from the environment
//! - Error types for the HTTP and GraphQL surfaces
//! - Application state

pub mod auth;
pub mod config;
pub mod error;
pub mod state;

pub use auth::{Claims, Session, decode_jwt, encode_jwt};
pub use config::Config;
pub use error::{AppError, GqlError, GqlErrorInterface, GqlResult, ResultExt};
pub use state::AppState;
