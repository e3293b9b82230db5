//! Matchmaker API - matchmaking directory service
//!
//! Users register a profile (name, age, gender, city, interests) and query
//! for compatible candidates filtered by age range, city, and opposite-gender
//! pairing, ranked by shared-interest overlap.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{find_matches, MatchOutcome};
pub use crate::models::{Interest, MatchFilters, MatchResponse, User};
pub use crate::services::{StoreError, UserStore};
