//! Web layer for the subway line manager.
//!
//! Provides HTTP endpoints for station and line management.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::create_router;
pub use state::AppState;
