use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::forecasting::config::{NEXT_DAY_STEPS, NEXT_MONTH_STEPS, NEXT_WEEK_STEPS};
use crate::forecasting::series::ObservationSeries;
use crate::model_store::LoadOutcome;

#[derive(Debug, Clone)]
pub enum ForecastProcessorInput {
    /// Merge new observations, refit (per policy), persist and forecast
    Refresh(ObservationSeries),
    /// Read the persisted history
    History,
    /// Inspect the persisted model
    Model,
}

#[derive(Debug)]
pub enum ForecastProcessorOutput {
    Refresh(ForecastReport),
    History(ObservationSeries),
    Model(LoadOutcome),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ForecastReport {
    pub next_day: Vec<f64>,
    pub next_week: Vec<f64>,
    pub next_month: Vec<f64>,
    /// Length of the series the model was fitted on
    pub observations: usize,
    pub trained_through: NaiveDate,
    /// False when a persisted model was reused
    pub retrained: bool,
    pub coefficients: Vec<f64>,
}

impl ForecastReport {
    /// Split one 30-step forecast into the day, week and month horizons
    pub fn from_path(
        path: &[f64],
        observations: usize,
        trained_through: NaiveDate,
        retrained: bool,
        coefficients: Vec<f64>,
    ) -> Self {
        Self {
            next_day: path.iter().take(NEXT_DAY_STEPS).copied().collect(),
            next_week: path.iter().take(NEXT_WEEK_STEPS).copied().collect(),
            next_month: path.iter().take(NEXT_MONTH_STEPS).copied().collect(),
            observations,
            trained_through,
            retrained,
            coefficients,
        }
    }

    pub fn next_week_total(&self) -> f64 {
        self.next_week.iter().sum()
    }

    pub fn next_month_total(&self) -> f64 {
        self.next_month.iter().sum()
    }
}
