use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::models::{RunMatchingResponse, SubmitCandidateRequest, SubmitRoleRequest, SuccessResponse};
use crate::routes::matches::{error_response, spawn_matching_run, AppState};

/// Ingestion of collaborator output for candidates and roles
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/candidates", web::post().to(submit_candidate))
        .route("/roles", web::post().to(submit_role));
}

/// Store a candidate evaluation and trigger matching
///
/// POST /api/v1/candidates
async fn submit_candidate(
    state: web::Data<AppState>,
    req: web::Json<SubmitCandidateRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(error_response(400, "Validation failed", errors.to_string()));
    }

    let req = req.into_inner();
    let candidate_profile_id = req.candidate_profile_id.clone();
    let attributes = req
        .evaluation
        .into_attributes(req.candidate_profile_id, req.candidate_id, req.transcript);

    if let Err(e) = state.store.save_candidate(&attributes).await {
        tracing::error!("Failed to save candidate profile {}: {}", candidate_profile_id, e);
        return HttpResponse::InternalServerError().json(error_response(
            500,
            "Failed to save candidate profile",
            e.to_string(),
        ));
    }

    let run_id = spawn_matching_run(state.engine.clone(), state.cache.clone(), candidate_profile_id);

    HttpResponse::Accepted().json(RunMatchingResponse {
        accepted: true,
        run_id,
    })
}

/// Store the extracted requirements of a role
///
/// POST /api/v1/roles
async fn submit_role(
    state: web::Data<AppState>,
    req: web::Json<SubmitRoleRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(error_response(400, "Validation failed", errors.to_string()));
    }

    let req = req.into_inner();
    let role = req.extraction.into_requirements(req.role_id);

    match state.store.save_role(&role).await {
        Ok(()) => {
            state.cache.invalidate_roles(&[role.id.clone()]).await;
            tracing::info!("Saved requirements for role {}", role.id);
            HttpResponse::Ok().json(SuccessResponse { success: true })
        }
        Err(e) => {
            tracing::error!("Failed to save role {}: {}", role.id, e);
            HttpResponse::InternalServerError().json(error_response(500, "Failed to save role", e.to_string()))
        }
    }
}
