// Core algorithm exports
pub mod aggregate;
pub mod filters;
pub mod matcher;
pub mod ranking;
pub mod scoring;

pub use aggregate::{aggregate_scores, weighted_sum, DISQUALIFIED_CAP};
pub use filters::has_deal_breaker;
pub use matcher::{score_pair, MatchError, MatchRunSummary, MatchingEngine, DEFAULT_EVALUATION_CONCURRENCY};
pub use ranking::{rank_matches, RankingResult, DEFAULT_TOP_K};
pub use scoring::{calculate_culture_score, calculate_experience_score, calculate_skill_score};
