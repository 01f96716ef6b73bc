pub mod history;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::forecasting::sarima::FittedSarima;
use crate::forecasting::series::ObservationSeries;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("history file error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid history: {0}")]
    InvalidHistory(String),

    #[error("failed to serialize model: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// The persisted model artifact
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StoredModel {
    pub fitted: FittedSarima,
    /// Last date of the series the model was fitted on
    pub trained_through: NaiveDate,
    pub observations: usize,
    pub trained_at: DateTime<Utc>,
}

/// Result of looking for a persisted model
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// No model has been persisted yet
    Absent,
    /// A model file exists but could not be used
    Corrupt(String),
    Loaded(StoredModel),
}

/// Owns the history file and the model file.
///
/// Callers are expected to serialize writers (see `AppConfig::refresh_lock`).
#[derive(Debug, Clone)]
pub struct ModelStore {
    history_path: PathBuf,
    model_path: PathBuf,
}

impl ModelStore {
    pub fn new(history_path: impl Into<PathBuf>, model_path: impl Into<PathBuf>) -> Self {
        Self {
            history_path: history_path.into(),
            model_path: model_path.into(),
        }
    }

    pub fn history_path(&self) -> &Path {
        &self.history_path
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn load_model(&self) -> LoadOutcome {
        let raw = match fs::read_to_string(&self.model_path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return LoadOutcome::Absent,
            Err(e) => return LoadOutcome::Corrupt(format!("failed to read model file: {}", e)),
        };

        let model: StoredModel = match serde_json::from_str(&raw) {
            Ok(model) => model,
            Err(e) => return LoadOutcome::Corrupt(format!("failed to decode model file: {}", e)),
        };

        match model.fitted.check_consistency() {
            Ok(()) => LoadOutcome::Loaded(model),
            Err(detail) => LoadOutcome::Corrupt(detail),
        }
    }

    pub fn load_history(&self) -> Result<ObservationSeries, StoreError> {
        history::read_history(&self.history_path)
    }

    /// Write the history and, when given, the model.
    ///
    /// Each artifact is written to a sibling temp file and renamed into place once both
    /// temp files are complete.
    pub fn persist(
        &self,
        model: Option<&StoredModel>,
        history: &ObservationSeries,
    ) -> Result<(), StoreError> {
        let history_tmp = temp_path(&self.history_path);
        ensure_parent(&self.history_path)?;
        history::write_history(&history_tmp, history)?;

        let model_tmp = match model {
            Some(model) => {
                let tmp = temp_path(&self.model_path);
                ensure_parent(&self.model_path)?;
                let json = serde_json::to_string_pretty(model)?;
                fs::write(&tmp, json).map_err(|e| StoreError::io(&tmp, e))?;
                Some(tmp)
            }
            None => None,
        };

        fs::rename(&history_tmp, &self.history_path)
            .map_err(|e| StoreError::io(&self.history_path, e))?;
        if let Some(tmp) = model_tmp {
            fs::rename(&tmp, &self.model_path).map_err(|e| StoreError::io(&self.model_path, e))?;
        }

        tracing::info!(
            history = %self.history_path.display(),
            rows = history.len(),
            model_written = model.is_some(),
            "Persisted forecasting state"
        );
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

fn ensure_parent(path: &Path) -> Result<(), StoreError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecasting::sarima::{Sarima, SarimaOrder};
    use tempfile::tempdir;

    fn store_in(dir: &Path) -> ModelStore {
        ModelStore::new(dir.join("expenses.csv"), dir.join("model.json"))
    }

    fn sample_model() -> StoredModel {
        let values: Vec<f64> = (0..40).map(|t| 50.0 + (t % 12) as f64).collect();
        let fitted = Sarima::new(SarimaOrder::default()).unwrap().fit(&values).unwrap();
        StoredModel {
            fitted,
            trained_through: NaiveDate::from_ymd_opt(2024, 2, 9).unwrap(),
            observations: 40,
            trained_at: Utc::now(),
        }
    }

    #[test]
    fn test_absent_when_no_model_file() {
        let dir = tempdir().unwrap();
        assert_eq!(store_in(dir.path()).load_model(), LoadOutcome::Absent);
    }

    #[test]
    fn test_corrupt_model_is_reported() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        fs::write(store.model_path(), "{ not json").unwrap();

        assert!(matches!(store.load_model(), LoadOutcome::Corrupt(_)));
    }

    #[test]
    fn test_persist_and_reload() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir.path().join("state"));
        let model = sample_model();
        let history: ObservationSeries = [(model.trained_through, 12.0)].into_iter().collect();

        store.persist(Some(&model), &history).unwrap();

        assert_eq!(store.load_model(), LoadOutcome::Loaded(model));
        assert_eq!(store.load_history().unwrap(), history);
        assert!(!temp_path(store.model_path()).exists());
        assert!(!temp_path(store.history_path()).exists());
    }

    #[test]
    fn test_persist_without_model_keeps_previous_model() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let model = sample_model();
        let history: ObservationSeries = [(model.trained_through, 1.0)].into_iter().collect();
        store.persist(Some(&model), &history).unwrap();

        let mut newer = history.clone();
        newer.insert(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(), 2.0);
        store.persist(None, &newer).unwrap();

        assert_eq!(store.load_history().unwrap(), newer);
        assert_eq!(store.load_model(), LoadOutcome::Loaded(model));
    }
}
