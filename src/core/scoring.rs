use crate::core::filters::{count_matched, fold_terms};
use crate::models::{ExperienceLevel, WorkStyle};

/// Score returned when a dimension has no signal
pub const NEUTRAL_SCORE: f64 = 5.0;

/// Ceiling of the required-skill component; preferred skills fill the rest
pub const REQUIRED_SKILLS_CEILING: f64 = 7.7;

/// Upper bound of every dimension score
pub const MAX_SCORE: f64 = 10.0;

/// Round to one decimal place
#[inline]
pub fn round_one(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Calculate the skill match score (0-10)
///
/// Scoring formula:
/// base = 7.7 * matched_required / total_required
/// score = min(base + 1.0 * matched_preferred, 10)
///
/// Without required skills there is nothing to measure and the score is
/// neutral, whatever the preferred skills are.
pub fn calculate_skill_score(
    candidate_skills: &[String],
    required_skills: &[String],
    preferred_skills: &[String],
) -> f64 {
    let required = fold_terms(required_skills);
    if required.is_empty() {
        return NEUTRAL_SCORE;
    }

    let candidate = fold_terms(candidate_skills);
    let preferred = fold_terms(preferred_skills);

    let matched_required = count_matched(&required, &candidate);
    let matched_preferred = count_matched(&preferred, &candidate);

    let base = if matched_required == required.len() {
        REQUIRED_SKILLS_CEILING
    } else {
        (matched_required as f64 / required.len() as f64) * REQUIRED_SKILLS_CEILING
    };

    round_one((base + matched_preferred as f64).min(MAX_SCORE))
}

/// Calculate the experience match score (0-10)
///
/// Discrete and asymmetric: one level above the target costs less than
/// one level below it.
#[inline]
pub fn calculate_experience_score(
    candidate_level: Option<ExperienceLevel>,
    role_level: Option<ExperienceLevel>,
) -> f64 {
    let (candidate, role) = match (candidate_level, role_level) {
        (Some(c), Some(r)) => (c, r),
        _ => return NEUTRAL_SCORE,
    };

    match candidate.index() - role.index() {
        0 => 10.0,
        1 => 8.0,
        -1 => 6.0,
        _ => 2.0,
    }
}

/// Calculate the culture match score (0-10)
///
/// Two halves worth 5 points each: work style agreement and the share of
/// role culture values echoed by the candidate's strengths. Each half
/// gives 2.5 when one side is missing.
pub fn calculate_culture_score(
    work_style_preference: Option<WorkStyle>,
    role_work_style: Option<WorkStyle>,
    strengths: &[String],
    culture_values: &[String],
) -> f64 {
    let work_style_score = match (work_style_preference, role_work_style) {
        (Some(preferred), Some(offered)) if preferred == offered => 5.0,
        (Some(_), Some(_)) => 0.0,
        _ => 2.5,
    };

    let strengths = fold_terms(strengths);
    let values = fold_terms(culture_values);

    let values_score = if strengths.is_empty() || values.is_empty() {
        2.5
    } else {
        let overlap = count_matched(&values, &strengths);
        (overlap as f64 / values.len() as f64) * 5.0
    };

    round_one((work_style_score + values_score).min(MAX_SCORE))
}
