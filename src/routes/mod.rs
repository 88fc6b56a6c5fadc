// Route exports
pub mod matches;
pub mod profiles;

use actix_web::web;

/// Mount every handler under the versioned API scope
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure)
            .configure(profiles::configure),
    );
}
