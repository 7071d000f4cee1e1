//! Web layer for the reachability server.
//!
//! JSON endpoints for feed metadata, hiding-stop listings and reachability
//! queries.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
