use async_trait::async_trait;
use thiserror::Error;
use crate::models::{CandidateAttributes, MatchScore, RoleMatch, RoleRequirements};

/// Errors that can occur when reading or writing match data
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Record access needed by the matching core
///
/// Implemented by [`crate::services::PostgresClient`]; tests substitute an
/// in-memory store.
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Point read of one candidate profile
    async fn get_candidate(
        &self,
        candidate_profile_id: &str,
    ) -> Result<Option<CandidateAttributes>, StoreError>;

    /// Bulk read of every role's requirements
    async fn list_roles(&self) -> Result<Vec<RoleRequirements>, StoreError>;

    /// Insert or replace match scores keyed by (role, candidate profile).
    ///
    /// Must be atomic: either every record is written or none is.
    async fn upsert_match_scores(&self, scores: &[MatchScore]) -> Result<u64, StoreError>;

    /// Match scores for one role joined with their candidate profiles
    async fn get_role_matches(&self, role_id: &str) -> Result<Vec<RoleMatch>, StoreError>;

    /// Candidate ids the role has already connected with
    async fn get_connected_candidates(&self, role_id: &str) -> Result<Vec<String>, StoreError>;

    /// Record a new connection
    ///
    /// [`StoreError::Conflict`] if it already exists, [`StoreError::NotFound`]
    /// if the role does not.
    async fn record_connection(&self, role_id: &str, candidate_id: &str) -> Result<(), StoreError>;

    async fn save_candidate(&self, candidate: &CandidateAttributes) -> Result<(), StoreError>;

    async fn save_role(&self, role: &RoleRequirements) -> Result<(), StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}
