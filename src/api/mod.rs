//! HTTP API for the streakboard dashboard.
//!
//! ## Endpoints
//!
//! - `GET /` - Server-rendered dashboard page
//! - `GET /api/health` - Health check
//! - `GET /api/overview` - Per-user streak and progress summary
//! - `GET /api/users` - Configured participants
//! - `GET /api/users/{user}/log` - Full record table for one user
//! - `PUT /api/users/{user}/log/latest` - Edit the latest record's task text
//! - `GET /api/users/{user}/export` - Download the raw CSV log
//! - `POST /api/tasks` - Submit today's task

mod dashboard;
mod routes;
pub mod types;

pub use routes::{router, serve, AppState};
pub use types::*;
