use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use std::sync::Arc;
use talent_match::config::{LoggingSettings, Settings};
use talent_match::core::MatchingEngine;
use talent_match::routes::{self, matches::AppState};
use talent_match::services::{
    CacheManager, DisabledEvaluator, HttpEvaluator, MatchStore, PostgresClient, TechnicalEvaluator,
};
use tracing::{info, error, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_logging(logging: &LoggingSettings) {
    let filter = EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn build_evaluator(settings: &Settings) -> Arc<dyn TechnicalEvaluator> {
    let Some(endpoint) = settings.evaluator.endpoint.clone() else {
        warn!("No evaluator endpoint configured, technical scores will use interview fallbacks");
        return Arc::new(DisabledEvaluator);
    };

    match HttpEvaluator::new(endpoint, settings.evaluator.api_key.clone(), settings.evaluator.timeout_secs) {
        Ok(evaluator) => Arc::new(evaluator),
        Err(e) => {
            error!("Failed to build evaluator client ({}), using interview fallbacks", e);
            Arc::new(DisabledEvaluator)
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    init_logging(&settings.logging);

    info!("Starting Talent Match service...");

    let postgres = PostgresClient::from_settings(
        &settings.database.url,
        settings.database.max_connections,
        settings.database.min_connections,
        settings.database.acquire_timeout_secs,
        settings.database.idle_timeout_secs,
    )
    .await
    .map_err(|e| {
        error!("Failed to connect to PostgreSQL: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    let store: Arc<dyn MatchStore> = Arc::new(postgres);

    info!("PostgreSQL client initialized");

    let cache = Arc::new(CacheManager::new(
        settings.ranking.cache_size,
        settings.ranking.cache_ttl_secs,
    ));

    let weights = settings.default_weights();
    let engine = MatchingEngine::new(store.clone(), build_evaluator(&settings), weights)
        .with_concurrency(settings.evaluator.max_concurrency);

    info!("Matching engine initialized with weights: {:?}", weights);

    let app_state = AppState {
        store,
        cache,
        engine,
        top_k: settings.ranking.top_k,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
