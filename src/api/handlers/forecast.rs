use axum::{extract::State, Json};

use crate::{
    api::{
        error::ApiError, extractors::ExpensePayloadExtractor, response::ForecastResponse,
        validation::validate_report,
    },
    forecasting::processor_enums::{ForecastProcessorInput, ForecastProcessorOutput},
    ingestion::{collect_records, operations::normalize},
    utils::{app_config::AppConfig, traits::ActionProcessor},
};

/// POST /forecast (also mounted at POST /)
///
/// Accepts `{"expenses": [...]}`, a bare list of `{"date", "amount"}` records, or
/// `{"token": "..."}` to pull the records from the upstream transaction API. The
/// observations are merged into the persisted history, the model is refreshed and the
/// day, week and month forecasts are returned.
pub async fn forecast(
    State(app_config): State<AppConfig>,
    ExpensePayloadExtractor(payload): ExpensePayloadExtractor,
) -> Result<Json<ForecastResponse>, ApiError> {
    let records = collect_records(payload, app_config.upstream.as_ref()).await?;
    let summary = normalize(&records)?;
    tracing::info!(
        accepted = summary.accepted,
        dropped = summary.dropped,
        days = summary.series.len(),
        "Received expense observations"
    );

    let config = app_config.forecast.clone();
    let result = ForecastProcessorInput::Refresh(summary.series)
        .process(&app_config, &config)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    match result {
        ForecastProcessorOutput::Refresh(report) => {
            validate_report(&report)?;
            Ok(Json(ForecastResponse::from(&report)))
        }
        _ => Err(ApiError::internal_error("Unexpected response type")),
    }
}
