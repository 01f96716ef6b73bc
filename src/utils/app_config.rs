use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use clap::{Args, Parser};
use dotenvy::dotenv;
use tokio::sync::Mutex;

use crate::api::config::ApiConfig;
use crate::forecasting::config::{ForecastArgs, ForecastConfig};
use crate::ingestion::upstream::UpstreamClient;
use crate::model_store::ModelStore;

#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Flat file holding the expense history
    #[clap(long, env, default_value = "expenses.csv")]
    pub history_path: PathBuf,

    /// Serialized model artifact
    #[clap(long, env, default_value = "model_sarima_fit.json")]
    pub model_path: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct UpstreamArgs {
    /// Remote transaction API used for `{"token": ...}` payloads
    #[clap(long, env)]
    pub upstream_url: Option<String>,

    #[clap(long, env, default_value_t = 30)]
    pub upstream_timeout_secs: u64,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "expense-forecaster", about = "Expense forecasting API")]
pub struct ServerArgs {
    #[clap(flatten)]
    pub api: ApiConfig,

    #[clap(flatten)]
    pub store: StoreArgs,

    #[clap(flatten)]
    pub forecast: ForecastArgs,

    #[clap(flatten)]
    pub upstream: UpstreamArgs,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: ModelStore,
    pub forecast: ForecastConfig,
    pub upstream: Option<UpstreamClient>,
    /// Held for the whole load-fit-persist sequence so only one request writes at a time
    pub refresh_lock: Arc<Mutex<()>>,
}

impl AppConfig {
    pub fn new(store: ModelStore, forecast: ForecastConfig, upstream: Option<UpstreamClient>) -> Self {
        Self {
            store,
            forecast,
            upstream,
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn from_args(
        store: &StoreArgs,
        forecast: &ForecastArgs,
        upstream: &UpstreamArgs,
    ) -> Result<Self> {
        let forecast = ForecastConfig::from(forecast);
        forecast.order.validate()?;

        let upstream = upstream
            .upstream_url
            .as_ref()
            .map(|url| UpstreamClient::new(url.clone(), Duration::from_secs(upstream.upstream_timeout_secs)))
            .transpose()?;

        Ok(Self::new(
            ModelStore::new(store.history_path.clone(), store.model_path.clone()),
            forecast,
            upstream,
        ))
    }

    pub fn from_env() -> Result<(Self, ApiConfig)> {
        let _ = dotenv();
        let args = ServerArgs::try_parse().map_err(|e| anyhow!(e))?;
        let app_config = Self::from_args(&args.store, &args.forecast, &args.upstream)?;
        Ok((app_config, args.api))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecasting::config::RefreshPolicy;

    #[test]
    fn test_defaults() {
        let args = ServerArgs::try_parse_from(["expense-forecaster"]).unwrap();
        assert_eq!(args.store.model_path, PathBuf::from("model_sarima_fit.json"));
        assert_eq!(args.forecast.seasonal_period, 12);
        assert_eq!(args.forecast.refresh_policy, RefreshPolicy::Always);
        assert!(args.forecast.fill_daily);
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = ServerArgs::try_parse_from([
            "expense-forecaster",
            "--seasonal-period",
            "7",
            "--refresh-policy",
            "reuse",
            "--fill-daily",
            "false",
            "--upstream-url",
            "http://localhost:9000/transactions",
        ])
        .unwrap();

        let config = AppConfig::from_args(&args.store, &args.forecast, &args.upstream).unwrap();
        assert_eq!(config.forecast.order.period, 7);
        assert_eq!(config.forecast.policy, RefreshPolicy::Reuse);
        assert!(!config.forecast.fill_daily);
        assert_eq!(
            config.upstream.as_ref().map(|u| u.url()),
            Some("http://localhost:9000/transactions")
        );
    }

    #[test]
    fn test_invalid_period_rejected() {
        let args =
            ServerArgs::try_parse_from(["expense-forecaster", "--seasonal-period", "1"]).unwrap();
        assert!(AppConfig::from_args(&args.store, &args.forecast, &args.upstream).is_err());
    }
}
