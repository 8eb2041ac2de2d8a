//! HTTP adapters - REST API implementations.
//!
//! Each area has its own module with DTOs, handlers, and routes. All share
//! [`AppState`] and the [`ApiError`] to response mapping.

pub mod assignment;
pub mod error;
pub mod health;
pub mod ranking;
pub mod router;
pub mod state;

pub use error::{ApiError, ErrorResponse};
pub use router::{api_router, app_router};
pub use state::{AppState, ConsumerStatus};
