use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::core::{rank_matches as rank, MatchError, MatchingEngine};
use crate::models::{
    ConnectRequest, ErrorResponse, HealthResponse, RankMatchesRequest, RankMatchesResponse,
    RoleMatch, RunMatchingRequest, RunMatchingResponse, SuccessResponse, WeightVector,
};
use crate::services::{CacheManager, MatchStore, StoreError};
use std::collections::HashSet;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MatchStore>,
    pub cache: Arc<CacheManager>,
    pub engine: MatchingEngine,
    pub top_k: usize,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches/run", web::post().to(run_matching))
        .route("/matches/rank", web::post().to(rank_matches))
        .route("/connections", web::post().to(connect));
}

pub(crate) fn error_response(status: u16, error: &str, message: impl Into<String>) -> ErrorResponse {
    ErrorResponse {
        error: error.to_string(),
        message: message.into(),
        status_code: status,
    }
}

/// Start a matching run in the background and return its id
///
/// The caller never waits for the run: failures are logged and the
/// candidate simply has no match rows until a later run succeeds.
pub fn spawn_matching_run(
    engine: MatchingEngine,
    cache: Arc<CacheManager>,
    candidate_profile_id: String,
) -> String {
    let run_id = uuid::Uuid::new_v4().to_string();
    let task_run_id = run_id.clone();

    tokio::spawn(async move {
        match engine.run_for_candidate(&candidate_profile_id).await {
            Ok(summary) => {
                cache.invalidate_roles(&summary.role_ids).await;
                tracing::info!(
                    "Matching run {} finished for {}: {} records written",
                    task_run_id,
                    candidate_profile_id,
                    summary.records_written
                );
            }
            Err(MatchError::CandidateNotFound(id)) => {
                tracing::warn!("Matching run {} skipped: candidate profile {} not found", task_run_id, id);
            }
            Err(e) => {
                tracing::error!("Matching run {} failed for {}: {}", task_run_id, candidate_profile_id, e);
            }
        }
    });

    run_id
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let db_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if db_healthy { "healthy" } else { "degraded" };

    tracing::debug!("Health check: {} ({} cached roles)", status, state.cache.stats().entries);

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Trigger matching for a candidate profile
///
/// POST /api/v1/matches/run
///
/// Request body:
/// ```json
/// { "candidateProfileId": "string" }
/// ```
async fn run_matching(
    state: web::Data<AppState>,
    req: web::Json<RunMatchingRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(error_response(400, "Validation failed", errors.to_string()));
    }

    let run_id = spawn_matching_run(
        state.engine.clone(),
        state.cache.clone(),
        req.candidate_profile_id.clone(),
    );

    tracing::info!("Accepted matching run {} for {}", run_id, req.candidate_profile_id);

    HttpResponse::Accepted().json(RunMatchingResponse {
        accepted: true,
        run_id,
    })
}

/// Re-rank the stored matches of a role
///
/// POST /api/v1/matches/rank
///
/// Request body:
/// ```json
/// {
///   "roleId": "string",
///   "weights": { "skills": 35, "experience": 20, "culture": 15, "technical": 30 },
///   "preset": "balanced",
///   "limit": 5
/// }
/// ```
async fn rank_matches(
    state: web::Data<AppState>,
    req: web::Json<RankMatchesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(error_response(400, "Validation failed", errors.to_string()));
    }

    let weights = match (&req.weights, &req.preset) {
        (Some(weights), _) => *weights,
        (None, Some(preset)) => match WeightVector::preset(preset) {
            Some(weights) => weights,
            None => {
                return HttpResponse::BadRequest().json(error_response(
                    400,
                    "Invalid preset",
                    "Preset must be one of: recommended, balanced, skills-first, culture-first, technical-depth",
                ));
            }
        },
        (None, None) => state.engine.weights(),
    };

    let matches = match load_role_matches(&state, &req.role_id).await {
        Ok(matches) => matches,
        Err(e) => {
            tracing::error!("Failed to load matches for role {}: {}", req.role_id, e);
            return HttpResponse::InternalServerError().json(error_response(
                500,
                "Failed to load matches",
                e.to_string(),
            ));
        }
    };

    // Connection badges are cosmetic; rank without them rather than fail
    let connected: HashSet<String> = match state.store.get_connected_candidates(&req.role_id).await {
        Ok(ids) => ids.into_iter().collect(),
        Err(e) => {
            tracing::warn!("Failed to fetch connections for role {}, proceeding without: {}", req.role_id, e);
            HashSet::new()
        }
    };

    let limit = req.limit.unwrap_or(state.top_k);
    let result = rank(&matches, &weights, &connected, limit);

    tracing::debug!(
        "Ranked {} of {} matches for role {}",
        result.matches.len(),
        result.total_matches,
        req.role_id
    );

    HttpResponse::Ok().json(RankMatchesResponse {
        role_id: req.role_id.clone(),
        matches: result.matches,
        weights: result.weights,
        total_matches: result.total_matches,
    })
}

async fn load_role_matches(state: &AppState, role_id: &str) -> Result<Arc<Vec<RoleMatch>>, StoreError> {
    state
        .cache
        .get_or_load_role_matches(role_id, || state.store.get_role_matches(role_id))
        .await
}

/// Connect a role with a candidate
///
/// POST /api/v1/connections
async fn connect(
    state: web::Data<AppState>,
    req: web::Json<ConnectRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(error_response(400, "Validation failed", errors.to_string()));
    }

    match state.store.record_connection(&req.role_id, &req.candidate_id).await {
        Ok(()) => HttpResponse::Ok().json(SuccessResponse { success: true }),
        Err(StoreError::Conflict(_)) => HttpResponse::Conflict().json(error_response(
            409,
            "Already connected",
            "Already connected with this candidate.",
        )),
        Err(StoreError::NotFound(message)) => {
            HttpResponse::NotFound().json(error_response(404, "Role not found", message))
        }
        Err(e) => {
            tracing::error!("Failed to record connection {} -> {}: {}", req.role_id, req.candidate_id, e);
            HttpResponse::InternalServerError().json(error_response(500, "Failed to record connection", e.to_string()))
        }
    }
}
