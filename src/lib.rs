//! Talent Match - deterministic candidate-to-role matching service
//!
//! Scores interviewed candidates against founder roles across four
//! dimensions (skills, experience, culture, technical), combines them under
//! configurable weights with a deal-breaker cap, persists one match record
//! per role and candidate, and re-ranks stored matches under live weights.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{MatchingEngine, MatchError, MatchRunSummary, rank_matches, score_pair};
pub use models::{CandidateAttributes, RoleRequirements, MatchScore, RoleMatch, RankedMatch, WeightVector};
