// Public library interface for expense-forecaster
pub mod api;
pub mod cli_utils;
pub mod forecasting;
pub mod ingestion;
pub mod model_store;
pub mod utils;
