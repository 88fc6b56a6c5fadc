use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use crate::models::WeightVector;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub evaluator: EvaluatorSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub ranking: RankingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

/// Technical relevance evaluator; matching falls back to interview
/// scores when no endpoint is set.
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluatorSettings {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_evaluator_timeout")]
    pub timeout_secs: u64,
    /// Evaluations in flight per matching run
    #[serde(default = "default_evaluator_concurrency")]
    pub max_concurrency: usize,
}

impl Default for EvaluatorSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_secs: default_evaluator_timeout(),
            max_concurrency: default_evaluator_concurrency(),
        }
    }
}

fn default_evaluator_timeout() -> u64 { 20 }
fn default_evaluator_concurrency() -> usize { crate::core::DEFAULT_EVALUATION_CONCURRENCY }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

/// Default weights applied when scores are persisted
#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_skills_weight")]
    pub skills: f64,
    #[serde(default = "default_experience_weight")]
    pub experience: f64,
    #[serde(default = "default_culture_weight")]
    pub culture: f64,
    #[serde(default = "default_technical_weight")]
    pub technical: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            skills: default_skills_weight(),
            experience: default_experience_weight(),
            culture: default_culture_weight(),
            technical: default_technical_weight(),
        }
    }
}

impl From<&WeightsConfig> for WeightVector {
    fn from(value: &WeightsConfig) -> Self {
        WeightVector::new(value.skills, value.experience, value.culture, value.technical)
    }
}

fn default_skills_weight() -> f64 { 35.0 }
fn default_experience_weight() -> f64 { 20.0 }
fn default_culture_weight() -> f64 { 15.0 }
fn default_technical_weight() -> f64 { 30.0 }

#[derive(Debug, Clone, Deserialize)]
pub struct RankingSettings {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_cache_size")]
    pub cache_size: u64,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            cache_ttl_secs: default_cache_ttl(),
            cache_size: default_cache_size(),
        }
    }
}

fn default_top_k() -> usize { 5 }
fn default_cache_ttl() -> u64 { 300 }
fn default_cache_size() -> u64 { 1000 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with TALENT__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., TALENT__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("TALENT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = apply_env_overrides(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("TALENT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn default_weights(&self) -> WeightVector {
        WeightVector::from(&self.scoring.weights)
    }
}

/// Apply the conventional unprefixed variables on top of the layered config.
/// DATABASE_URL wins over TALENT__DATABASE__URL; LOG_LEVEL and LOG_FORMAT
/// override the logging section.
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(database_url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }
    if let Ok(endpoint) = env::var("EVALUATOR_ENDPOINT") {
        builder = builder.set_override("evaluator.endpoint", endpoint)?;
    }
    if let Ok(api_key) = env::var("EVALUATOR_API_KEY") {
        builder = builder.set_override("evaluator.api_key", api_key)?;
    }
    if let Ok(level) = env::var("LOG_LEVEL") {
        builder = builder.set_override("logging.level", level)?;
    }
    if let Ok(format) = env::var("LOG_FORMAT") {
        builder = builder.set_override("logging.format", format)?;
    }

    builder.build()
}
