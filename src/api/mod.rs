pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod validation;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::utils::app_config::AppConfig;
use config::ApiConfig;
use handlers::{forecast::forecast, health::health, history::*};
use middleware::auth::require_bearer;

/// Build the application router
pub fn router(app_config: AppConfig, api_config: &ApiConfig) -> Router {
    let mut router = Router::new()
        // Health check - public endpoint
        .route("/health", get(health))
        // Forecast endpoints, both paths are in use by clients
        .route("/", post(forecast))
        .route("/forecast", post(forecast))
        .route("/history", get(get_history))
        .route("/model", get(get_model))
        .with_state(app_config);

    if api_config.auth_enabled() {
        let secret_key = api_config.secret_key.clone().unwrap_or_default();
        router = router.layer(from_fn_with_state(secret_key, require_bearer));
    } else {
        tracing::warn!("API_SECRET_KEY not set, API is unauthenticated");
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
