use std::env;

use expense_forecaster::api::{self, config::ApiConfig};
use expense_forecaster::utils::app_config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            env::var("RUST_LOG")
                .unwrap_or_else(|_| "info".to_string())
                .as_str(),
        )
        .init();

    let (app_config, api_config): (AppConfig, ApiConfig) = AppConfig::from_env()?;
    tracing::info!(
        history = %app_config.store.history_path().display(),
        model = %app_config.store.model_path().display(),
        policy = ?app_config.forecast.policy,
        seasonal_period = app_config.forecast.order.period,
        upstream = app_config.upstream.as_ref().map(|u| u.url()).unwrap_or("disabled"),
        "Application configuration loaded successfully"
    );
    if app_config.forecast.fill_daily && app_config.forecast.order.period != 7 {
        tracing::warn!(
            seasonal_period = app_config.forecast.order.period,
            "Series is resampled daily but the seasonal period is not weekly"
        );
    }

    let router = api::router(app_config, &api_config);

    let addr = format!("0.0.0.0:{}", api_config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Starting expense forecast server on {}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
