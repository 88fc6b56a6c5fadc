use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Seniority scale, ordered junior < mid < senior < lead
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Junior,
    Mid,
    Senior,
    Lead,
}

impl ExperienceLevel {
    /// Position on the seniority scale
    pub fn index(self) -> i32 {
        match self {
            ExperienceLevel::Junior => 0,
            ExperienceLevel::Mid => 1,
            ExperienceLevel::Senior => 2,
            ExperienceLevel::Lead => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExperienceLevel::Junior => "junior",
            ExperienceLevel::Mid => "mid",
            ExperienceLevel::Senior => "senior",
            ExperienceLevel::Lead => "lead",
        }
    }

    /// Lenient parse for values coming from collaborators; anything
    /// unrecognised is treated as unknown.
    pub fn parse_loose(value: Option<&str>) -> Option<Self> {
        value.and_then(|v| v.parse().ok())
    }
}

impl FromStr for ExperienceLevel {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "junior" => Ok(ExperienceLevel::Junior),
            "mid" => Ok(ExperienceLevel::Mid),
            "senior" => Ok(ExperienceLevel::Senior),
            "lead" => Ok(ExperienceLevel::Lead),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Preferred or offered work arrangement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkStyle {
    Remote,
    Hybrid,
    Onsite,
}

impl WorkStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkStyle::Remote => "remote",
            WorkStyle::Hybrid => "hybrid",
            WorkStyle::Onsite => "onsite",
        }
    }

    pub fn parse_loose(value: Option<&str>) -> Option<Self> {
        value.and_then(|v| v.parse().ok())
    }
}

impl FromStr for WorkStyle {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "remote" => Ok(WorkStyle::Remote),
            "hybrid" => Ok(WorkStyle::Hybrid),
            "onsite" | "on-site" => Ok(WorkStyle::Onsite),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

impl fmt::Display for WorkStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown variant: {0:?}")]
pub struct UnknownVariant(pub String);

/// Structured candidate attributes produced by the interview evaluator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateAttributes {
    /// Candidate profile id
    pub id: String,
    /// Owning candidate account id
    #[serde(default)]
    pub candidate_id: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience_level: Option<ExperienceLevel>,
    #[serde(default)]
    pub experience_years: Option<u32>,
    #[serde(default)]
    pub work_style_preference: Option<WorkStyle>,
    #[serde(default)]
    pub strengths: Vec<String>,
    /// Overall interview score, role independent
    #[serde(default)]
    pub technical_score: Option<f64>,
    #[serde(default)]
    pub behavioral_score: Option<f64>,
    #[serde(default)]
    pub system_design_score: Option<f64>,
    #[serde(default, skip_serializing)]
    pub transcript: Option<String>,
}

impl CandidateAttributes {
    /// Role-independent technical score used when no role-specific
    /// evaluation is available.
    ///
    /// Prefers the evaluator's overall interview score, then the
    /// behavioral (30%) and system design (70%) phase scores, then 5.0.
    pub fn fallback_technical_score(&self) -> f64 {
        if let Some(score) = self.technical_score.filter(|s| s.is_finite()) {
            return score.clamp(0.0, 10.0);
        }

        let behavioral = self.behavioral_score.filter(|s| s.is_finite());
        let system_design = self.system_design_score.filter(|s| s.is_finite());

        if behavioral.is_none() && system_design.is_none() {
            return 5.0;
        }

        let blended = behavioral.unwrap_or(0.0) * 0.3 + system_design.unwrap_or(0.0) * 0.7;
        blended.clamp(0.0, 10.0)
    }
}

/// Hiring requirements extracted from one founder profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRequirements {
    pub id: String,
    #[serde(default)]
    pub role_title: Option<String>,
    #[serde(default)]
    pub role_description: Option<String>,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub preferred_skills: Vec<String>,
    #[serde(default)]
    pub experience_level: Option<ExperienceLevel>,
    #[serde(default)]
    pub work_style: Option<WorkStyle>,
    #[serde(default)]
    pub culture_values: Vec<String>,
    #[serde(default)]
    pub deal_breakers: Vec<String>,
}

/// One of the four scored dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Skill,
    Experience,
    Culture,
    Technical,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Skill,
        Dimension::Experience,
        Dimension::Culture,
        Dimension::Technical,
    ];
}

/// Per-dimension scores, each 0-10
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionScores {
    pub skill: f64,
    pub experience: f64,
    pub culture: f64,
    pub technical: f64,
}

impl DimensionScores {
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Skill => self.skill,
            Dimension::Experience => self.experience,
            Dimension::Culture => self.culture,
            Dimension::Technical => self.technical,
        }
    }
}

/// Persisted match record, unique per (role, candidate profile)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchScore {
    pub role_id: String,
    pub candidate_profile_id: String,
    #[serde(flatten)]
    pub scores: DimensionScores,
    pub overall_match_score: f64,
    /// Whether a role deal-breaker matched this candidate
    pub disqualified: bool,
    #[serde(default)]
    pub match_reasoning: Option<String>,
}

/// Dimension weights, in arbitrary non-negative units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightVector {
    pub skills: f64,
    pub experience: f64,
    pub culture: f64,
    pub technical: f64,
}

impl WeightVector {
    pub const RECOMMENDED: WeightVector = WeightVector::new(35.0, 20.0, 15.0, 30.0);
    pub const BALANCED: WeightVector = WeightVector::new(25.0, 25.0, 25.0, 25.0);
    pub const SKILLS_FIRST: WeightVector = WeightVector::new(55.0, 15.0, 5.0, 25.0);
    pub const CULTURE_FIRST: WeightVector = WeightVector::new(20.0, 15.0, 50.0, 15.0);
    pub const TECHNICAL_DEPTH: WeightVector = WeightVector::new(20.0, 15.0, 5.0, 60.0);

    pub const fn new(skills: f64, experience: f64, culture: f64, technical: f64) -> Self {
        Self {
            skills,
            experience,
            culture,
            technical,
        }
    }

    /// Look up a named dashboard preset
    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "recommended" => Some(Self::RECOMMENDED),
            "balanced" => Some(Self::BALANCED),
            "skills-first" => Some(Self::SKILLS_FIRST),
            "culture-first" => Some(Self::CULTURE_FIRST),
            "technical-depth" => Some(Self::TECHNICAL_DEPTH),
            _ => None,
        }
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Skill => self.skills,
            Dimension::Experience => self.experience,
            Dimension::Culture => self.culture,
            Dimension::Technical => self.technical,
        }
    }

    /// Scale the weights so they sum to one.
    ///
    /// Negative and non-finite components count as zero; an all-zero
    /// vector becomes equal quarters.
    pub fn normalized(&self) -> NormalizedWeights {
        let sanitize = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };

        let skills = sanitize(self.skills);
        let experience = sanitize(self.experience);
        let culture = sanitize(self.culture);
        let technical = sanitize(self.technical);
        let total = skills + experience + culture + technical;

        if total <= 0.0 {
            return NormalizedWeights {
                skills: 0.25,
                experience: 0.25,
                culture: 0.25,
                technical: 0.25,
            };
        }

        NormalizedWeights {
            skills: skills / total,
            experience: experience / total,
            culture: culture / total,
            technical: technical / total,
        }
    }
}

impl Default for WeightVector {
    fn default() -> Self {
        Self::RECOMMENDED
    }
}

/// Weights that sum to one
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedWeights {
    pub skills: f64,
    pub experience: f64,
    pub culture: f64,
    pub technical: f64,
}

impl NormalizedWeights {
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Skill => self.skills,
            Dimension::Experience => self.experience,
            Dimension::Culture => self.culture,
            Dimension::Technical => self.technical,
        }
    }
}

/// A persisted match joined with its candidate, as read back for one role
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleMatch {
    pub role_id: String,
    pub candidate_profile_id: String,
    #[serde(default)]
    pub candidate_id: Option<String>,
    #[serde(default)]
    pub skill_match_score: Option<f64>,
    #[serde(default)]
    pub experience_match_score: Option<f64>,
    #[serde(default)]
    pub culture_match_score: Option<f64>,
    #[serde(default)]
    pub technical_score: Option<f64>,
    #[serde(default)]
    pub overall_match_score: Option<f64>,
    /// Absent for rows written before the flag was stored
    #[serde(default)]
    pub disqualified: Option<bool>,
    #[serde(default)]
    pub match_reasoning: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience_level: Option<ExperienceLevel>,
    #[serde(default)]
    pub experience_years: Option<u32>,
    #[serde(default)]
    pub strengths: Vec<String>,
}

impl RoleMatch {
    /// Stored dimension scores, missing values read as zero
    pub fn dimension_scores(&self) -> DimensionScores {
        DimensionScores {
            skill: self.skill_match_score.unwrap_or(0.0),
            experience: self.experience_match_score.unwrap_or(0.0),
            culture: self.culture_match_score.unwrap_or(0.0),
            technical: self.technical_score.unwrap_or(0.0),
        }
    }
}

/// One entry of the re-ranked list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedMatch {
    pub rank: usize,
    pub candidate_profile_id: String,
    pub candidate_id: Option<String>,
    pub scores: DimensionScores,
    pub weighted_score: f64,
    pub is_connected: bool,
    pub strongest_dimension: Dimension,
    pub weakest_dimension: Dimension,
    pub match_reasoning: Option<String>,
    pub skills: Vec<String>,
    pub experience_level: Option<ExperienceLevel>,
}
