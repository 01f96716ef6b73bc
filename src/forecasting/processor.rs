use anyhow::{Result, anyhow};
use chrono::Utc;

use crate::forecasting::config::{ForecastConfig, NEXT_MONTH_STEPS, RefreshPolicy};
use crate::forecasting::processor_enums::{
    ForecastProcessorInput, ForecastProcessorOutput, ForecastReport,
};
use crate::forecasting::sarima::Sarima;
use crate::forecasting::series::ObservationSeries;
use crate::model_store::{LoadOutcome, ModelStore, StoredModel};
use crate::utils::app_config::AppConfig;
use crate::utils::traits::ActionProcessor;

impl ActionProcessor<ForecastConfig, ForecastProcessorOutput> for ForecastProcessorInput {
    async fn process(
        &self,
        app_config: &AppConfig,
        local_config: &ForecastConfig,
    ) -> Result<ForecastProcessorOutput> {
        match self {
            ForecastProcessorInput::Refresh(incoming) => {
                let _guard = app_config.refresh_lock.lock().await;

                let store = app_config.store.clone();
                let config = local_config.clone();
                let incoming = incoming.clone();

                // Fitting is CPU bound, keep it off the async workers
                let report = tokio::task::spawn_blocking(move || refresh(&store, &config, &incoming))
                    .await
                    .map_err(|e| anyhow!("Forecast worker failed: {}", e))??;

                Ok(ForecastProcessorOutput::Refresh(report))
            }
            ForecastProcessorInput::History => {
                let _guard = app_config.refresh_lock.lock().await;
                let history = app_config.store.load_history()?;
                Ok(ForecastProcessorOutput::History(history))
            }
            ForecastProcessorInput::Model => {
                let _guard = app_config.refresh_lock.lock().await;
                Ok(ForecastProcessorOutput::Model(app_config.store.load_model()))
            }
        }
    }
}

/// Merge `incoming` into the persisted history, obtain a model according to the refresh
/// policy, persist, and forecast the day, week and month horizons.
pub fn refresh(
    store: &ModelStore,
    config: &ForecastConfig,
    incoming: &ObservationSeries,
) -> Result<ForecastReport> {
    let mut merged = store.load_history()?;
    let previous_len = merged.len();
    merged.merge(incoming);
    tracing::info!(
        previous = previous_len,
        incoming = incoming.len(),
        merged = merged.len(),
        "Merged observations into history"
    );

    let training = if config.fill_daily {
        merged.fill_daily()
    } else {
        merged.clone()
    };

    let reusable = match config.policy {
        RefreshPolicy::Always => None,
        RefreshPolicy::Reuse => match store.load_model() {
            LoadOutcome::Loaded(model) if model.fitted.order == config.order => Some(model),
            LoadOutcome::Loaded(model) => {
                tracing::warn!(
                    persisted = ?model.fitted.order,
                    configured = ?config.order,
                    "Persisted model order differs from configuration, refitting"
                );
                None
            }
            LoadOutcome::Absent => {
                tracing::info!("No persisted model, fitting from scratch");
                None
            }
            LoadOutcome::Corrupt(detail) => {
                tracing::warn!(%detail, "Persisted model is unreadable, refitting");
                None
            }
        },
    };

    let (model, retrained) = match reusable {
        Some(model) => (model, false),
        None => (fit(config, &training)?, true),
    };

    store.persist(retrained.then_some(&model), &merged)?;

    let path = model.fitted.forecast(NEXT_MONTH_STEPS);
    Ok(ForecastReport::from_path(
        &path,
        model.observations,
        model.trained_through,
        retrained,
        model.fitted.coefficients.clone(),
    ))
}

fn fit(config: &ForecastConfig, training: &ObservationSeries) -> Result<StoredModel> {
    let trained_through = training
        .last_date()
        .ok_or_else(|| anyhow!("Cannot fit a model on an empty series"))?;

    let fitted = Sarima::new(config.order)?
        .fit(&training.values())
        .map_err(|e| anyhow!("Model could not be trained: {}", e))?;

    tracing::info!(
        observations = training.len(),
        coefficients = ?fitted.coefficients,
        sigma2 = fitted.sigma2,
        converged = fitted.converged,
        "Model retrained"
    );

    Ok(StoredModel {
        fitted,
        trained_through,
        observations: training.len(),
        trained_at: Utc::now(),
    })
}
