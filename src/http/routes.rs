use super::handlers;
use super::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.service.cors_origins);
    let body_limit = state.config.audio.max_ingest_bytes;
    let static_dir = state.config.service.static_dir.clone();

    let router = Router::new()
        // Health and occupancy
        .route("/health", get(handlers::health_check))
        .route("/status", get(handlers::status))
        // Admission
        .route("/reserve", post(handlers::reserve))
        .route("/keepalive", post(handlers::keepalive))
        .route("/end", post(handlers::end_session))
        // Audio ingest
        .route("/ingest", post(handlers::ingest))
        .route("/ingest-raw", post(handlers::ingest_raw))
        // Live feeds
        .route("/captions", get(handlers::captions))
        .route("/notes", get(handlers::notes))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}
