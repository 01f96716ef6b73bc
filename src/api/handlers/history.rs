use axum::{extract::State, Json};

use crate::{
    api::{error::ApiError, response::ModelSummary},
    forecasting::{
        processor_enums::{ForecastProcessorInput, ForecastProcessorOutput},
        series::SeriesPoint,
    },
    model_store::LoadOutcome,
    utils::{app_config::AppConfig, traits::ActionProcessor},
};

/// GET /history - Persisted expense history, one point per day
pub async fn get_history(
    State(app_config): State<AppConfig>,
) -> Result<Json<Vec<SeriesPoint>>, ApiError> {
    let result = ForecastProcessorInput::History
        .process(&app_config, &app_config.forecast)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to read history: {}", e)))?;

    match result {
        ForecastProcessorOutput::History(series) => Ok(Json(series.points())),
        _ => Err(ApiError::internal_error("Unexpected response type")),
    }
}

/// GET /model - Summary of the persisted model
pub async fn get_model(
    State(app_config): State<AppConfig>,
) -> Result<Json<ModelSummary>, ApiError> {
    let result = ForecastProcessorInput::Model
        .process(&app_config, &app_config.forecast)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    match result {
        ForecastProcessorOutput::Model(LoadOutcome::Loaded(model)) => {
            Ok(Json(ModelSummary::from(&model)))
        }
        ForecastProcessorOutput::Model(LoadOutcome::Absent) => Err(ApiError::not_found("Model")),
        ForecastProcessorOutput::Model(LoadOutcome::Corrupt(detail)) => Err(
            ApiError::internal_error(format!("Persisted model is unreadable: {}", detail)),
        ),
        _ => Err(ApiError::internal_error("Unexpected response type")),
    }
}
