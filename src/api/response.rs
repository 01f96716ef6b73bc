use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::forecasting::processor_enums::ForecastReport;
use crate::forecasting::sarima::SarimaOrder;
use crate::model_store::StoredModel;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}

/// Body of a successful forecast. Short horizons are point forecasts, the month is
/// the expected total over the next 30 days.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ForecastResponse {
    pub next_day_forecast: Vec<f64>,
    pub next_week_forecast: Vec<f64>,
    pub next_month_forecast: f64,
}

impl From<&ForecastReport> for ForecastResponse {
    fn from(report: &ForecastReport) -> Self {
        Self {
            next_day_forecast: report.next_day.clone(),
            next_week_forecast: report.next_week.clone(),
            next_month_forecast: report.next_month_total(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ModelSummary {
    pub order: SarimaOrder,
    pub coefficients: Vec<f64>,
    pub sigma2: f64,
    pub converged: bool,
    pub trained_through: NaiveDate,
    pub observations: usize,
    pub trained_at: DateTime<Utc>,
}

impl From<&StoredModel> for ModelSummary {
    fn from(model: &StoredModel) -> Self {
        Self {
            order: model.fitted.order,
            coefficients: model.fitted.coefficients.clone(),
            sigma2: model.fitted.sigma2,
            converged: model.fitted.converged,
            trained_through: model.trained_through,
            observations: model.observations,
            trained_at: model.trained_at,
        }
    }
}
