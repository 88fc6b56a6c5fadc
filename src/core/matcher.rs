use crate::core::{
    aggregate::aggregate_scores,
    filters::has_deal_breaker,
    scoring::{calculate_culture_score, calculate_experience_score, calculate_skill_score, round_one},
};
use crate::models::{CandidateAttributes, DimensionScores, MatchScore, RoleRequirements, WeightVector};
use crate::services::{MatchStore, StoreError, TechnicalEvaluator};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use thiserror::Error;

/// Errors that abort a matching run
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Candidate profile not found: {0}")]
    CandidateNotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Outcome of one matching run
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRunSummary {
    pub candidate_profile_id: String,
    /// Roles the candidate was scored against
    pub role_ids: Vec<String>,
    pub records_written: u64,
    /// Roles whose technical score came from the role-independent fallback
    pub fallbacks: usize,
}

/// Score one (role, candidate) pair given the technical dimension
///
/// Pure: the same inputs always produce the same record.
pub fn score_pair(
    candidate: &CandidateAttributes,
    role: &RoleRequirements,
    technical_score: f64,
    weights: &WeightVector,
) -> MatchScore {
    let scores = DimensionScores {
        skill: calculate_skill_score(&candidate.skills, &role.required_skills, &role.preferred_skills),
        experience: calculate_experience_score(candidate.experience_level, role.experience_level),
        culture: calculate_culture_score(
            candidate.work_style_preference,
            role.work_style,
            &candidate.strengths,
            &role.culture_values,
        ),
        technical: round_one(technical_score.clamp(0.0, 10.0)),
    };

    let disqualified = has_deal_breaker(
        candidate.experience_level,
        candidate.work_style_preference,
        &role.deal_breakers,
    );

    MatchScore {
        role_id: role.id.clone(),
        candidate_profile_id: candidate.id.clone(),
        overall_match_score: aggregate_scores(&scores, weights, disqualified),
        scores,
        disqualified,
        match_reasoning: None,
    }
}

/// Default number of technical evaluations in flight per run
pub const DEFAULT_EVALUATION_CONCURRENCY: usize = 8;

/// Technical dimension for one role, as fed into [`score_pair`]
#[derive(Debug, Clone, PartialEq)]
struct TechnicalOutcome {
    score: f64,
    reasoning: Option<String>,
    fallback: bool,
}

/// Matching orchestrator
///
/// For one candidate profile: loads every role, scores each pair (fanning
/// out the per-role technical evaluations, at most `concurrency` at a time)
/// and writes all scores back in a single batch upsert. Holds no per-run
/// state, so one engine can serve any number of runs.
#[derive(Clone)]
pub struct MatchingEngine {
    store: Arc<dyn MatchStore>,
    evaluator: Arc<dyn TechnicalEvaluator>,
    weights: WeightVector,
    concurrency: usize,
}

impl MatchingEngine {
    pub fn new(
        store: Arc<dyn MatchStore>,
        evaluator: Arc<dyn TechnicalEvaluator>,
        weights: WeightVector,
    ) -> Self {
        Self {
            store,
            evaluator,
            weights,
            concurrency: DEFAULT_EVALUATION_CONCURRENCY,
        }
    }

    /// Cap the technical evaluations in flight per run (minimum 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn weights(&self) -> WeightVector {
        self.weights
    }

    /// Compute and persist match scores for a candidate against every role
    ///
    /// A missing candidate aborts before any write. No roles is a no-op.
    /// Evaluator failures fall back per role and never fail the run.
    pub async fn run_for_candidate(
        &self,
        candidate_profile_id: &str,
    ) -> Result<MatchRunSummary, MatchError> {
        let candidate = self
            .store
            .get_candidate(candidate_profile_id)
            .await?
            .ok_or_else(|| MatchError::CandidateNotFound(candidate_profile_id.to_string()))?;

        let roles = self.store.list_roles().await?;

        if roles.is_empty() {
            tracing::info!("No roles to match candidate {} against", candidate_profile_id);
            return Ok(MatchRunSummary {
                candidate_profile_id: candidate_profile_id.to_string(),
                role_ids: vec![],
                records_written: 0,
                fallbacks: 0,
            });
        }

        // Bounded fan-out; `buffered` keeps results in role order
        let technical: Vec<TechnicalOutcome> = stream::iter(
            roles
                .iter()
                .map(|role| self.technical_score_for(&candidate, role))
                .collect::<Vec<_>>(),
        )
        .buffered(self.concurrency)
        .collect()
        .await;

        let fallbacks = technical.iter().filter(|t| t.fallback).count();

        let scores: Vec<MatchScore> = roles
            .iter()
            .zip(technical)
            .map(|(role, outcome)| MatchScore {
                match_reasoning: outcome.reasoning,
                ..score_pair(&candidate, role, outcome.score, &self.weights)
            })
            .collect();

        let records_written = self.store.upsert_match_scores(&scores).await?;

        tracing::info!(
            "Scored candidate {} against {} role(s) ({} evaluator fallbacks)",
            candidate_profile_id,
            scores.len(),
            fallbacks
        );

        Ok(MatchRunSummary {
            candidate_profile_id: candidate_profile_id.to_string(),
            role_ids: roles.into_iter().map(|r| r.id).collect(),
            records_written,
            fallbacks,
        })
    }

    /// Role-specific technical score, or the fallback on any failure.
    /// Fallbacks carry no reasoning.
    async fn technical_score_for(
        &self,
        candidate: &CandidateAttributes,
        role: &RoleRequirements,
    ) -> TechnicalOutcome {
        let fallback = TechnicalOutcome {
            score: candidate.fallback_technical_score(),
            reasoning: None,
            fallback: true,
        };

        let transcript = match candidate.transcript.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => return fallback,
        };

        match self.evaluator.evaluate(transcript, role).await {
            Ok(assessment) if assessment.score.is_finite() => TechnicalOutcome {
                score: assessment.score.clamp(0.0, 10.0),
                reasoning: assessment.reasoning,
                fallback: false,
            },
            Ok(assessment) => {
                tracing::warn!(
                    "Evaluator returned non-finite score {} for role {}, using fallback",
                    assessment.score,
                    role.id
                );
                fallback
            }
            Err(e) => {
                tracing::warn!(
                    "Technical evaluation failed for candidate {} / role {}, using fallback: {}",
                    candidate.id,
                    role.id,
                    e
                );
                fallback
            }
        }
    }
}
