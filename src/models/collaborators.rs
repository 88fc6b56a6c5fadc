//! Partial payloads returned by the AI collaborators.
//!
//! Every field is optional: the extraction and evaluation services are
//! best-effort and routinely omit or null out fields.

use serde::{Deserialize, Serialize};
use crate::models::domain::{CandidateAttributes, ExperienceLevel, RoleRequirements, WorkStyle};

/// Candidate interview evaluation as returned by the evaluator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateEvaluationDto {
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    #[serde(default)]
    pub behavioral_score: Option<f64>,
    #[serde(default)]
    pub system_design_score: Option<f64>,
    #[serde(default)]
    pub overall_score: Option<f64>,
    #[serde(default)]
    pub experience_years: Option<f64>,
    #[serde(default)]
    pub experience_level: Option<String>,
    #[serde(default)]
    pub strengths: Option<Vec<String>>,
    #[serde(default)]
    pub work_style_preference: Option<String>,
}

impl CandidateEvaluationDto {
    pub fn into_attributes(
        self,
        id: impl Into<String>,
        candidate_id: Option<String>,
        transcript: Option<String>,
    ) -> CandidateAttributes {
        CandidateAttributes {
            id: id.into(),
            candidate_id,
            skills: self.skills.unwrap_or_default(),
            experience_level: ExperienceLevel::parse_loose(self.experience_level.as_deref()),
            experience_years: self
                .experience_years
                .filter(|y| y.is_finite() && *y >= 0.0)
                .map(|y| y.round() as u32),
            work_style_preference: WorkStyle::parse_loose(self.work_style_preference.as_deref()),
            strengths: self.strengths.unwrap_or_default(),
            technical_score: finite_score(self.overall_score),
            behavioral_score: finite_score(self.behavioral_score),
            system_design_score: finite_score(self.system_design_score),
            transcript,
        }
    }
}

/// Role requirements as extracted from a founder interview
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleExtractionDto {
    #[serde(default)]
    pub role_title: Option<String>,
    #[serde(default)]
    pub role_description: Option<String>,
    #[serde(default)]
    pub required_skills: Option<Vec<String>>,
    #[serde(default)]
    pub preferred_skills: Option<Vec<String>>,
    #[serde(default)]
    pub experience_level: Option<String>,
    #[serde(default)]
    pub work_style: Option<String>,
    #[serde(default)]
    pub culture_values: Option<Vec<String>>,
    #[serde(default)]
    pub deal_breakers: Option<Vec<String>>,
}

impl RoleExtractionDto {
    pub fn into_requirements(self, id: impl Into<String>) -> RoleRequirements {
        RoleRequirements {
            id: id.into(),
            role_title: self.role_title,
            role_description: self.role_description,
            required_skills: self.required_skills.unwrap_or_default(),
            preferred_skills: self.preferred_skills.unwrap_or_default(),
            experience_level: ExperienceLevel::parse_loose(self.experience_level.as_deref()),
            work_style: WorkStyle::parse_loose(self.work_style.as_deref()),
            culture_values: self.culture_values.unwrap_or_default(),
            deal_breakers: self.deal_breakers.unwrap_or_default(),
        }
    }
}

/// Role-specific technical relevance verdict
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TechnicalEvaluationDto {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

fn finite_score(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite()).map(|v| v.clamp(0.0, 10.0))
}
