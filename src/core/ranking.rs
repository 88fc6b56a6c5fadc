use crate::core::aggregate::{weighted_sum, DISQUALIFIED_CAP};
use crate::core::scoring::round_one;
use crate::models::{Dimension, DimensionScores, NormalizedWeights, RankedMatch, RoleMatch, WeightVector};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Number of candidates shown on the founder dashboard
pub const DEFAULT_TOP_K: usize = 5;

/// Result of re-ranking one role's matches
#[derive(Debug)]
pub struct RankingResult {
    pub matches: Vec<RankedMatch>,
    pub weights: NormalizedWeights,
    pub total_matches: usize,
}

/// Re-rank persisted matches under a live weight vector
///
/// Pure and synchronous: recombines the stored dimension scores, reapplies
/// the deal-breaker cap for flagged rows, sorts descending and keeps the
/// top `limit` entries. Ties keep a stable order by candidate profile id.
pub fn rank_matches(
    matches: &[RoleMatch],
    weights: &WeightVector,
    connected_candidate_ids: &HashSet<String>,
    limit: usize,
) -> RankingResult {
    let normalized = weights.normalized();

    let mut scored: Vec<(f64, &RoleMatch, DimensionScores)> = matches
        .iter()
        .map(|m| {
            let scores = m.dimension_scores();
            let mut weighted = weighted_sum(&scores, &normalized);
            if m.disqualified.unwrap_or(false) {
                weighted = weighted.min(DISQUALIFIED_CAP);
            }
            (weighted, m, scores)
        })
        .collect();

    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.1.candidate_profile_id.cmp(&b.1.candidate_profile_id))
    });

    let ranked = scored
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, (weighted, m, scores))| {
            let is_connected = m
                .candidate_id
                .as_ref()
                .map(|id| connected_candidate_ids.contains(id))
                .unwrap_or(false);

            RankedMatch {
                rank: i + 1,
                candidate_profile_id: m.candidate_profile_id.clone(),
                candidate_id: m.candidate_id.clone(),
                scores,
                weighted_score: round_one(weighted),
                is_connected,
                strongest_dimension: strongest_dimension(&scores),
                weakest_dimension: weakest_dimension(&scores),
                match_reasoning: m.match_reasoning.clone(),
                skills: m.skills.clone(),
                experience_level: m.experience_level,
            }
        })
        .collect();

    RankingResult {
        matches: ranked,
        weights: normalized,
        total_matches: matches.len(),
    }
}

/// Highest-scoring dimension; the first listed wins ties
pub fn strongest_dimension(scores: &DimensionScores) -> Dimension {
    Dimension::ALL
        .into_iter()
        .fold(Dimension::Skill, |best, d| {
            if scores.get(d) > scores.get(best) { d } else { best }
        })
}

/// Lowest-scoring dimension; the first listed wins ties
pub fn weakest_dimension(scores: &DimensionScores) -> Dimension {
    Dimension::ALL
        .into_iter()
        .fold(Dimension::Skill, |worst, d| {
            if scores.get(d) < scores.get(worst) { d } else { worst }
        })
}
