//! HTTP adapter for ranking-state endpoints, mounted at `/api/ranking-states`.
//!
//! - `GET /user/:user_id` - All states, best first
//! - `GET /user/:user_id/top-profiles?limit=` - The best `limit` states
//! - `GET /user/:user_id/stats` - Aggregate summary
//! - `GET /user/:user_id/profile/:profile_id` - One state
//! - `GET /user/:user_id/profile/:profile_id/history` - Rank trend
//! - `GET /user/:user_id/profile/:profile_id/drift` - Drift classification
//! - `DELETE /user/:user_id` - Purge every state of the user

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use routes::ranking_routes;
