use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

use crate::ingestion::types::ExpenseRecord;

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Upstream request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Upstream returned a malformed body: {0}")]
    Malformed(String),
}

/// Client for the remote transaction API
#[derive(Clone, Debug)]
pub struct UpstreamClient {
    url: String,
    client: Client,
}

impl UpstreamClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the caller's transactions, authenticating with their bearer token.
    /// Expects a JSON array of `{"Date": ..., "amount": ...}` records.
    pub async fn fetch_expenses(&self, token: &str) -> Result<Vec<ExpenseRecord>, UpstreamError> {
        let response = self
            .client
            .get(&self.url)
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str::<Vec<ExpenseRecord>>(&body)
            .map_err(|e| UpstreamError::Malformed(e.to_string()))
    }
}
