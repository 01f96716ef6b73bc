use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde_json::Value;

use crate::api::error::ApiError;
use crate::ingestion::types::ExpensePayload;

/// JSON body extractor for forecast requests that reports every rejection as a 400
pub struct ExpensePayloadExtractor(pub ExpensePayload);

#[async_trait]
impl<S> FromRequest<S> for ExpensePayloadExtractor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to parse JSON: {}", e)))?;

        if value.is_null() {
            return Err(ApiError::bad_request("No data received"));
        }
        if value.as_object().is_some_and(|o| o.is_empty()) {
            return Err(ApiError::bad_request("No data received"));
        }

        let payload = serde_json::from_value::<ExpensePayload>(value).map_err(|_| {
            ApiError::bad_request(
                "Expected {\"expenses\": [{\"date\", \"amount\"}]}, a list of {\"date\", \"amount\"} records, or {\"token\": ...}",
            )
        })?;

        Ok(ExpensePayloadExtractor(payload))
    }
}
