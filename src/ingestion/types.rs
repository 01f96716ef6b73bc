use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::forecasting::series::ObservationSeries;

/// Raw record as received, before any coercion. Both fields are required; their
/// contents are validated later so a single bad row does not reject the request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExpenseRecord {
    #[serde(alias = "Date")]
    pub date: Value,
    #[serde(alias = "Amount", alias = "Expense")]
    pub amount: Value,
}

impl ExpenseRecord {
    pub fn new(date: impl Into<Value>, amount: impl Into<Value>) -> Self {
        Self {
            date: date.into(),
            amount: amount.into(),
        }
    }
}

/// Accepted request bodies
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum ExpensePayload {
    /// `{"expenses": [{"date": ..., "amount": ...}]}`
    Expenses { expenses: Vec<ExpenseRecord> },
    /// `{"token": "..."}`, records are fetched from the upstream API
    Remote { token: String },
    /// `[{"date": ..., "amount": ...}]`
    List(Vec<ExpenseRecord>),
}

/// A validated observation
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub amount: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct IngestionSummary {
    pub series: ObservationSeries,
    pub accepted: usize,
    pub dropped: usize,
}
