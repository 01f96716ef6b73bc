use crate::api::error::ApiError;
use crate::forecasting::processor_enums::ForecastReport;

/// Reject a report that would serialize non-finite numbers
pub fn validate_report(report: &ForecastReport) -> Result<(), ApiError> {
    if report.next_month.iter().any(|v| !v.is_finite()) {
        return Err(ApiError::internal_error(
            "Model produced non-finite forecasts",
        ));
    }
    Ok(())
}
