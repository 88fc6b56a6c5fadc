// Service exports
pub mod cache;
pub mod evaluator;
pub mod postgres;
pub mod store;

pub use cache::{CacheKey, CacheManager, CacheStats};
pub use evaluator::{
    DisabledEvaluator, EvaluatorError, HttpEvaluator, TechnicalAssessment, TechnicalEvaluator,
};
pub use postgres::PostgresClient;
pub use store::{MatchStore, StoreError};
