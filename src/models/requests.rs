use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::collaborators::{CandidateEvaluationDto, RoleExtractionDto};
use crate::models::domain::WeightVector;

/// Request to (re)compute matches for a candidate profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RunMatchingRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "candidate_profile_id", rename = "candidateProfileId")]
    pub candidate_profile_id: String,
}

/// Request to re-rank the persisted matches of one role
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RankMatchesRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "role_id", rename = "roleId")]
    pub role_id: String,
    /// Live slider values; takes precedence over `preset`
    #[serde(default)]
    pub weights: Option<WeightVector>,
    #[serde(default)]
    pub preset: Option<String>,
    #[validate(range(min = 1, max = 50))]
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Request to connect a founder role with a candidate
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConnectRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "role_id", rename = "roleId")]
    pub role_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "candidate_id", rename = "candidateId")]
    pub candidate_id: String,
}

/// Store the evaluator's output for a candidate profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitCandidateRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "candidate_profile_id", rename = "candidateProfileId")]
    pub candidate_profile_id: String,
    #[serde(default, alias = "candidate_id", rename = "candidateId")]
    pub candidate_id: Option<String>,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub evaluation: CandidateEvaluationDto,
}

/// Store the extracted requirements for a founder role
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitRoleRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "role_id", rename = "roleId")]
    pub role_id: String,
    #[serde(default)]
    pub extraction: RoleExtractionDto,
}
