//! # LifeFlow Application Library
//!
//! The HTTP API, CLI, configuration and persistence layers around
//! `lifeflow-core`. Exposed as a library so integration tests can build
//! the router without starting a server.

pub mod api;
pub mod cli;
pub mod config;
pub mod persistence;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current time in unix seconds. A clock before the epoch reads as 0.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
