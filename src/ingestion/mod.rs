pub mod operations;
pub mod types;
pub mod upstream;

use thiserror::Error;

use crate::ingestion::types::{ExpensePayload, ExpenseRecord};
use crate::ingestion::upstream::{UpstreamClient, UpstreamError};

#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("No data received")]
    Empty,

    #[error("No valid observations in payload ({dropped} rows dropped)")]
    NoValidObservations { dropped: usize },

    #[error("token cannot be empty")]
    MissingToken,

    #[error("Remote fetch is not configured on this server")]
    RemoteNotConfigured,

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl IngestionError {
    /// Whether the failure was caused by the request itself rather than the server
    /// or its collaborators
    pub fn is_client_error(&self) -> bool {
        !matches!(self, IngestionError::Upstream(_))
    }
}

/// Resolve a payload into raw records, calling the upstream API for token payloads
pub async fn collect_records(
    payload: ExpensePayload,
    upstream: Option<&UpstreamClient>,
) -> Result<Vec<ExpenseRecord>, IngestionError> {
    match payload {
        ExpensePayload::Expenses { expenses } => Ok(expenses),
        ExpensePayload::List(records) => Ok(records),
        ExpensePayload::Remote { token } => {
            if token.trim().is_empty() {
                return Err(IngestionError::MissingToken);
            }
            let client = upstream.ok_or(IngestionError::RemoteNotConfigured)?;
            let records = client.fetch_expenses(&token).await?;
            tracing::info!(records = records.len(), "Fetched expenses from upstream");
            Ok(records)
        }
    }
}
