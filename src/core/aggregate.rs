use crate::core::scoring::{round_one, MAX_SCORE};
use crate::models::{Dimension, DimensionScores, NormalizedWeights, WeightVector};

/// Highest overall score a disqualified candidate can reach
pub const DISQUALIFIED_CAP: f64 = 3.0;

/// Weighted sum of the dimension scores, unrounded
#[inline]
pub fn weighted_sum(scores: &DimensionScores, weights: &NormalizedWeights) -> f64 {
    Dimension::ALL
        .iter()
        .map(|d| scores.get(*d) * weights.get(*d))
        .sum()
}

/// Combine dimension scores into the overall match score (0-10)
///
/// Weights are normalized first, so any non-negative vector works. A
/// disqualified pair is capped at [`DISQUALIFIED_CAP`] whatever the weights.
pub fn aggregate_scores(
    scores: &DimensionScores,
    weights: &WeightVector,
    disqualified: bool,
) -> f64 {
    let mut overall = weighted_sum(scores, &weights.normalized());

    if disqualified {
        overall = overall.min(DISQUALIFIED_CAP);
    }

    round_one(overall).clamp(0.0, MAX_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(skill: f64, experience: f64, culture: f64, technical: f64) -> DimensionScores {
        DimensionScores {
            skill,
            experience,
            culture,
            technical,
        }
    }

    #[test]
    fn test_perfect_scores_any_weights() {
        let perfect = scores(10.0, 10.0, 10.0, 10.0);

        for weights in [
            WeightVector::RECOMMENDED,
            WeightVector::BALANCED,
            WeightVector::new(0.1, 0.2, 0.3, 0.4),
            WeightVector::new(1.0, 0.0, 0.0, 0.0),
        ] {
            assert_eq!(aggregate_scores(&perfect, &weights, false), 10.0);
        }
    }

    #[test]
    fn test_default_weights() {
        // 8*.35 + 10*.20 + 6*.15 + 6*.30 = 2.8 + 2 + .9 + 1.8
        let overall = aggregate_scores(&scores(8.0, 10.0, 6.0, 6.0), &WeightVector::RECOMMENDED, false);
        assert_eq!(overall, 7.5);
    }

    #[test]
    fn test_unnormalized_weights_are_scaled() {
        let s = scores(8.0, 4.0, 6.0, 2.0);
        let small = aggregate_scores(&s, &WeightVector::new(1.0, 1.0, 1.0, 1.0), false);
        let large = aggregate_scores(&s, &WeightVector::new(40.0, 40.0, 40.0, 40.0), false);

        assert_eq!(small, 5.0);
        assert_eq!(small, large);
    }

    #[test]
    fn test_zero_weights_fall_back_to_quarters() {
        let overall = aggregate_scores(&scores(8.0, 4.0, 6.0, 2.0), &WeightVector::new(0.0, 0.0, 0.0, 0.0), false);
        assert_eq!(overall, 5.0);
    }

    #[test]
    fn test_disqualified_cap() {
        let overall = aggregate_scores(&scores(10.0, 10.0, 10.0, 10.0), &WeightVector::RECOMMENDED, true);
        assert_eq!(overall, 3.0);
    }

    #[test]
    fn test_cap_keeps_lower_scores() {
        let overall = aggregate_scores(&scores(2.0, 2.0, 2.0, 2.0), &WeightVector::BALANCED, true);
        assert_eq!(overall, 2.0);
    }
}
