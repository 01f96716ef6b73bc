use std::collections::BTreeMap;
use std::str::FromStr;

use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::forecasting::series::ObservationSeries;
use crate::ingestion::IngestionError;
use crate::ingestion::types::{ExpenseRecord, IngestionSummary, Observation};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Earliest year accepted for an observation. Daily filling spans first to last date.
const MIN_YEAR: i32 = 1970;
/// How far past today an observation may be dated
const MAX_DAYS_AHEAD: i64 = 366;

/// Parse a date from a JSON value. Only strings are accepted.
pub fn parse_date(value: &Value) -> Option<NaiveDate> {
    let s = value.as_str()?.trim();

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Coerce a JSON number or numeric string into an exact decimal
pub fn parse_amount(value: &Value) -> Option<BigDecimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().replace(',', ""),
        _ => return None,
    };
    if text.is_empty() {
        return None;
    }
    let amount = BigDecimal::from_str(&text).ok()?;
    // The model works in f64
    amount.to_f64().filter(|v| v.is_finite())?;
    Some(amount)
}

/// Whether `date` falls in the window of plausible observation dates relative to `today`
pub fn within_window(date: NaiveDate, today: NaiveDate) -> bool {
    date.year() >= MIN_YEAR && (date - today).num_days() <= MAX_DAYS_AHEAD
}

pub fn parse_record(record: &ExpenseRecord) -> Option<Observation> {
    let date = parse_date(&record.date)?;
    if !within_window(date, Utc::now().date_naive()) {
        return None;
    }
    Some(Observation {
        date,
        amount: parse_amount(&record.amount)?,
    })
}

/// Validate raw records into a daily series.
///
/// Rows with an unparsable or out-of-range date or amount are dropped and counted; same-day
/// amounts are summed, and a day whose total overflows `f64` is dropped with all its rows.
/// Fails when there is nothing to work with.
pub fn normalize(records: &[ExpenseRecord]) -> Result<IngestionSummary, IngestionError> {
    if records.is_empty() {
        return Err(IngestionError::Empty);
    }

    let mut observations = Vec::with_capacity(records.len());
    let mut dropped = 0;
    for record in records {
        match parse_record(record) {
            Some(obs) => observations.push(obs),
            None => {
                dropped += 1;
                tracing::warn!(date = %record.date, amount = %record.amount, "Dropping unparsable expense row");
            }
        }
    }

    let mut totals: BTreeMap<NaiveDate, (BigDecimal, usize)> = BTreeMap::new();
    for obs in &observations {
        let entry = totals.entry(obs.date).or_default();
        entry.0 += &obs.amount;
        entry.1 += 1;
    }
    for (day, (total, rows)) in &totals {
        if total.to_f64().is_some_and(|v| v.is_finite()) {
            continue;
        }
        dropped += rows;
        observations.retain(|o| o.date != *day);
        tracing::warn!(date = %day, rows, "Dropping day whose total is out of range");
    }

    if observations.is_empty() {
        return Err(IngestionError::NoValidObservations { dropped });
    }

    Ok(IngestionSummary {
        series: ObservationSeries::from_observations(&observations),
        accepted: observations.len(),
        dropped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date(&json!("2024-01-05")), Some(date("2024-01-05")));
        assert_eq!(parse_date(&json!("2024/01/05")), Some(date("2024-01-05")));
        assert_eq!(parse_date(&json!("05.01.2024")), Some(date("2024-01-05")));
        assert_eq!(parse_date(&json!("2024-01-05T10:30:00.250")), Some(date("2024-01-05")));
        assert_eq!(parse_date(&json!("2024-01-05T10:30:00Z")), Some(date("2024-01-05")));
        assert_eq!(parse_date(&json!("2024-01-05 23:59:59")), Some(date("2024-01-05")));
        assert_eq!(parse_date(&json!(" 2024-01-05 ")), Some(date("2024-01-05")));
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert_eq!(parse_date(&json!("not-a-date")), None);
        assert_eq!(parse_date(&json!("2024-02-30")), None);
        assert_eq!(parse_date(&json!(20240105)), None);
        assert_eq!(parse_date(&Value::Null), None);
    }

    #[test]
    fn test_parse_amount_coercion() {
        assert_eq!(parse_amount(&json!(12)), Some(BigDecimal::from(12)));
        assert_eq!(parse_amount(&json!("12.50")), BigDecimal::from_str("12.5").ok());
        assert_eq!(parse_amount(&json!("1,250.00")), BigDecimal::from_str("1250").ok());
        assert_eq!(parse_amount(&json!(-3.25)), BigDecimal::from_str("-3.25").ok());
        assert_eq!(parse_amount(&json!("abc")), None);
        assert_eq!(parse_amount(&json!("NaN")), None);
        assert_eq!(parse_amount(&json!("")), None);
        assert_eq!(parse_amount(&json!(true)), None);
        assert_eq!(parse_amount(&json!("1e400")), None);
        assert_eq!(parse_amount(&json!("-1e400")), None);
    }

    #[test]
    fn test_date_window() {
        let today = date("2024-06-01");
        assert!(within_window(date("1970-01-01"), today));
        assert!(within_window(date("2025-06-01"), today));
        assert!(!within_window(date("0001-01-01"), today));
        assert!(!within_window(date("1969-12-31"), today));
        assert!(!within_window(date("2030-01-01"), today));
    }

    #[test]
    fn test_normalize_drops_out_of_range_dates() {
        let records = vec![
            ExpenseRecord::new("0001-01-01", 10),
            ExpenseRecord::new("9999-12-31", 10),
            ExpenseRecord::new("2024-01-02", 4),
        ];

        let summary = normalize(&records).unwrap();
        assert_eq!(summary.accepted, 1);
        assert_eq!(summary.dropped, 2);
        assert_eq!(summary.series.dates(), vec![date("2024-01-02")]);
    }

    #[test]
    fn test_normalize_rejects_amounts_beyond_f64() {
        let records = vec![ExpenseRecord::new("2024-01-01", "1e400")];
        assert!(matches!(
            normalize(&records),
            Err(IngestionError::NoValidObservations { dropped: 1 })
        ));

        // Each row fits in f64 but the day total does not
        let records = vec![
            ExpenseRecord::new("2024-01-01", "1e308"),
            ExpenseRecord::new("2024-01-01", "1e308"),
            ExpenseRecord::new("2024-01-02", 4),
        ];
        let summary = normalize(&records).unwrap();
        assert_eq!(summary.accepted, 1);
        assert_eq!(summary.dropped, 2);
        assert_eq!(summary.series.dates(), vec![date("2024-01-02")]);
    }

    #[test]
    fn test_normalize_sums_duplicate_dates() {
        let records = vec![
            ExpenseRecord::new("2024-01-01", 10),
            ExpenseRecord::new("2024-01-01", 15),
            ExpenseRecord::new("2024-01-02", 4),
        ];

        let summary = normalize(&records).unwrap();
        assert_eq!(summary.accepted, 3);
        assert_eq!(summary.dropped, 0);
        assert_eq!(summary.series.get(&date("2024-01-01")), Some(25.0));
        assert_eq!(summary.series.len(), 2);
    }

    #[test]
    fn test_normalize_drops_malformed_dates() {
        let records = vec![
            ExpenseRecord::new("not-a-date", 10),
            ExpenseRecord::new("2024-01-03", "oops"),
            ExpenseRecord::new("2024-01-02", 4),
        ];

        let summary = normalize(&records).unwrap();
        assert_eq!(summary.accepted, 1);
        assert_eq!(summary.dropped, 2);
        assert_eq!(summary.series.dates(), vec![date("2024-01-02")]);
    }

    #[test]
    fn test_normalize_empty_and_all_invalid() {
        assert!(matches!(normalize(&[]), Err(IngestionError::Empty)));

        let records = vec![ExpenseRecord::new("not-a-date", 10)];
        assert!(matches!(
            normalize(&records),
            Err(IngestionError::NoValidObservations { dropped: 1 })
        ));
    }

    #[test]
    fn test_payload_shapes() {
        use crate::ingestion::types::ExpensePayload;

        let wrapped: ExpensePayload =
            serde_json::from_value(json!({"expenses": [{"date": "2024-01-01", "amount": 1}]})).unwrap();
        assert!(matches!(wrapped, ExpensePayload::Expenses { ref expenses } if expenses.len() == 1));

        let list: ExpensePayload =
            serde_json::from_value(json!([{"Date": "2024-01-01", "amount": 1}])).unwrap();
        assert!(matches!(list, ExpensePayload::List(ref r) if r.len() == 1));

        let remote: ExpensePayload = serde_json::from_value(json!({"token": "abc"})).unwrap();
        assert!(matches!(remote, ExpensePayload::Remote { ref token } if token == "abc"));

        assert!(serde_json::from_value::<ExpensePayload>(json!({"rows": []})).is_err());
        assert!(serde_json::from_value::<ExpensePayload>(json!([{"date": "2024-01-01"}])).is_err());
    }
}
