//! HTTP API for note transforms and term definitions
//!
//! Provides:
//! - `POST /api/transform` - one transform
//! - `POST /api/definitions` - one term definition
//! - `GET /health` - liveness and credential status

pub mod error;
pub mod server;
pub mod state;

pub use error::{invalid_body, status_for, ApiError, ErrorBody};
pub use server::{router, ApiServer, ApiServerConfig};
pub use state::AppState;
