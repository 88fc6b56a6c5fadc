// Model exports
pub mod collaborators;
pub mod domain;
pub mod requests;
pub mod responses;

pub use collaborators::{CandidateEvaluationDto, RoleExtractionDto, TechnicalEvaluationDto};
pub use domain::{
    CandidateAttributes, Dimension, DimensionScores, ExperienceLevel, MatchScore, NormalizedWeights,
    RankedMatch, RoleMatch, RoleRequirements, WeightVector, WorkStyle,
};
pub use requests::{ConnectRequest, RankMatchesRequest, RunMatchingRequest, SubmitCandidateRequest, SubmitRoleRequest};
pub use responses::{ErrorResponse, HealthResponse, RankMatchesResponse, RunMatchingResponse, SuccessResponse};
