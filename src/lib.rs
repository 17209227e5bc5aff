//! # streakboard
//!
//! A small dashboard for a 75-day challenge: each participant logs one task
//! per calendar day, and the dashboard shows per-user streaks, progress toward
//! the challenge goal, and a warning when a streak breaks.
//!
//! This library provides:
//! - Per-user append-only CSV record logs
//! - Streak, eligibility, and break-detection logic over those logs
//! - An HTTP API plus a server-rendered dashboard page
//!
//! ## Data Flow
//! 1. A submission arrives via the API
//! 2. The eligibility check reads the user's log (one submission per day)
//! 3. The record is appended to the user's CSV log
//! 4. Every dashboard render re-reads the logs and recomputes streaks
//!
//! ## Modules
//! - `store`: per-user CSV record logs
//! - `streak`: streak calculator, eligibility check, break detection
//! - `clock`: injectable reference clock for "today"
//! - `api`: axum routes, DTOs, and the dashboard page

pub mod api;
pub mod clock;
pub mod config;
pub mod store;
pub mod streak;

pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use store::{Record, TaskLog};
pub use streak::StreakStatus;
