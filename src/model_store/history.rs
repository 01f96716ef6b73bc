use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::forecasting::series::ObservationSeries;
use crate::model_store::StoreError;

/// One row of the history file
#[derive(Serialize, Deserialize, Debug)]
struct HistoryRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Expense")]
    expense: f64,
}

/// Read the history file. A missing file is an empty history.
pub fn read_history(path: &Path) -> Result<ObservationSeries, StoreError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ObservationSeries::new()),
        Err(e) => return Err(StoreError::io(path, e)),
    };

    let mut reader = csv::Reader::from_reader(file);
    let mut series = ObservationSeries::new();
    for row in reader.deserialize::<HistoryRow>() {
        let row = row?;
        if !row.expense.is_finite() {
            return Err(StoreError::InvalidHistory(format!(
                "non-finite amount on {}",
                row.date
            )));
        }
        // Legacy files may hold several rows for one day
        let total = series.get(&row.date).unwrap_or(0.0) + row.expense;
        series.insert(row.date, total);
    }

    Ok(series)
}

/// Write the history file, one row per date in ascending order
pub fn write_history(path: &Path, series: &ObservationSeries) -> Result<(), StoreError> {
    let file = File::create(path).map_err(|e| StoreError::io(path, e))?;
    let mut writer = csv::Writer::from_writer(file);
    for (date, expense) in series.iter() {
        writer.serialize(HistoryRow {
            date: *date,
            expense: *expense,
        })?;
    }
    writer.flush().map_err(|e| StoreError::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_missing_file_is_empty_history() {
        let dir = tempdir().unwrap();
        let series = read_history(&dir.path().join("expenses.csv")).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expenses.csv");
        let series: ObservationSeries =
            [(date("2024-01-02"), 3.5), (date("2024-01-01"), 10.0)].into_iter().collect();

        write_history(&path, &series).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("Date,Expense\n2024-01-01,"));
        assert_eq!(read_history(&path).unwrap(), series);
    }

    #[test]
    fn test_duplicate_rows_are_summed_on_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expenses.csv");
        fs::write(&path, "Date,Expense\n2024-01-01,10\n2024-01-01,15\n").unwrap();

        let series = read_history(&path).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.get(&date("2024-01-01")), Some(25.0));
    }

    #[test]
    fn test_unreadable_history_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expenses.csv");
        fs::write(&path, "Date,Expense\nyesterday,ten\n").unwrap();

        assert!(read_history(&path).is_err());
    }
}
