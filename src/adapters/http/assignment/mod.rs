//! HTTP adapter for profile assignment endpoints.
//!
//! - `POST /api/profile-assignment/assign` - Fold observations, maybe commit
//! - `GET /api/profile-assignment/:user_id/status` - Current assignment status

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use routes::assignment_routes;
