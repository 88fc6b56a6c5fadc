use crate::models::{RoleRequirements, TechnicalEvaluationDto};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Errors from the technical relevance evaluator
#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Evaluator not configured")]
    NotConfigured,
}

/// Role-specific technical verdict
#[derive(Debug, Clone, PartialEq)]
pub struct TechnicalAssessment {
    /// 0-10 relevance score
    pub score: f64,
    pub reasoning: Option<String>,
}

impl TechnicalAssessment {
    pub fn new(score: f64) -> Self {
        Self { score, reasoning: None }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }
}

/// Scores how relevant a candidate's interview is to one specific role
#[async_trait]
pub trait TechnicalEvaluator: Send + Sync {
    async fn evaluate(
        &self,
        transcript: &str,
        role: &RoleRequirements,
    ) -> Result<TechnicalAssessment, EvaluatorError>;
}

/// Evaluator used when no endpoint is configured; always fails so the
/// engine takes the fallback score.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledEvaluator;

#[async_trait]
impl TechnicalEvaluator for DisabledEvaluator {
    async fn evaluate(
        &self,
        _transcript: &str,
        _role: &RoleRequirements,
    ) -> Result<TechnicalAssessment, EvaluatorError> {
        Err(EvaluatorError::NotConfigured)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EvaluationPayload<'a> {
    transcript: &'a str,
    role_title: Option<&'a str>,
    role_description: Option<&'a str>,
    required_skills: &'a [String],
    preferred_skills: &'a [String],
}

/// HTTP client for the external relevance evaluator
///
/// POSTs the transcript and the role summary as JSON and expects
/// `{"score": <0-10>}` back. Timeouts are enforced by the client.
pub struct HttpEvaluator {
    endpoint: String,
    api_key: Option<String>,
    client: Client,
}

impl HttpEvaluator {
    pub fn new(endpoint: String, api_key: Option<String>, timeout_secs: u64) -> Result<Self, EvaluatorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            endpoint,
            api_key,
            client,
        })
    }
}

#[async_trait]
impl TechnicalEvaluator for HttpEvaluator {
    async fn evaluate(
        &self,
        transcript: &str,
        role: &RoleRequirements,
    ) -> Result<TechnicalAssessment, EvaluatorError> {
        let payload = EvaluationPayload {
            transcript,
            role_title: role.role_title.as_deref(),
            role_description: role.role_description.as_deref(),
            required_skills: &role.required_skills,
            preferred_skills: &role.preferred_skills,
        };

        tracing::debug!("Requesting technical evaluation for role {}", role.id);

        let mut request = self.client.post(&self.endpoint).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(EvaluatorError::ApiError(format!(
                "Evaluation failed for role {}: {}",
                role.id,
                response.status()
            )));
        }

        let body: TechnicalEvaluationDto = response
            .json()
            .await
            .map_err(|e| EvaluatorError::InvalidResponse(e.to_string()))?;

        match body.score {
            Some(score) if score.is_finite() => Ok(TechnicalAssessment {
                score: score.clamp(0.0, 10.0),
                reasoning: body.reasoning.filter(|r| !r.trim().is_empty()),
            }),
            Some(score) => Err(EvaluatorError::InvalidResponse(format!("Non-finite score: {}", score))),
            None => Err(EvaluatorError::InvalidResponse("Missing score".into())),
        }
    }
}
