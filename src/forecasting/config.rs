use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::forecasting::sarima::SarimaOrder;

pub const NEXT_DAY_STEPS: usize = 1;
pub const NEXT_WEEK_STEPS: usize = 7;
pub const NEXT_MONTH_STEPS: usize = 30;

/// Whether a persisted model may be reused instead of refitting
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
pub enum RefreshPolicy {
    /// Refit on every request
    #[default]
    Always,
    /// Forecast from the persisted model when one loads cleanly, refit otherwise
    Reuse,
}

#[derive(Args, Debug, Clone)]
pub struct ForecastArgs {
    /// Seasonal period of the model. 12 assumes monthly seasonality even though the
    /// series is resampled daily
    #[clap(long, env, default_value_t = 12)]
    pub seasonal_period: usize,

    #[clap(long, env, value_enum, default_value_t = RefreshPolicy::Always)]
    pub refresh_policy: RefreshPolicy,

    /// Reindex the series to daily frequency (forward fill) before fitting
    #[clap(long, env, default_value_t = true, action = clap::ArgAction::Set)]
    pub fill_daily: bool,
}

/// Configuration for the retrain-and-forecast processor
#[derive(Clone, Debug)]
pub struct ForecastConfig {
    pub order: SarimaOrder,
    pub policy: RefreshPolicy,
    pub fill_daily: bool,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            order: SarimaOrder::default(),
            policy: RefreshPolicy::Always,
            fill_daily: true,
        }
    }
}

impl From<&ForecastArgs> for ForecastConfig {
    fn from(args: &ForecastArgs) -> Self {
        Self {
            order: SarimaOrder::default().with_period(args.seasonal_period),
            policy: args.refresh_policy,
            fill_daily: args.fill_daily,
        }
    }
}

impl ForecastConfig {
    pub fn with_policy(mut self, policy: RefreshPolicy) -> Self {
        self.policy = policy;
        self
    }
}
