//! Persisted model handles
//!
//! Models are fit offline and stored as JSON, one file per backend:
//! `<model_dir>/sarima/sarima_model.json` and
//! `<model_dir>/prophet/prophet_model.json`.

use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ModelKind, ProphetModel, SarimaModel};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::info;

/// Loader for fitted models under a fixed directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelStore {
    model_dir: PathBuf,
}

impl ModelStore {
    /// Create a store rooted at `model_dir`
    pub fn new<P: Into<PathBuf>>(model_dir: P) -> Self {
        Self {
            model_dir: model_dir.into(),
        }
    }

    /// Root directory
    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// File holding the model of `kind`
    pub fn path_for(&self, kind: ModelKind) -> PathBuf {
        self.model_dir
            .join(kind.as_str())
            .join(format!("{}_model.json", kind.as_str()))
    }

    /// Load the fitted model of `kind`.
    ///
    /// A missing or undecodable file is a [`ForecastError::ModelLoad`]; it is
    /// not retried.
    pub fn load(&self, kind: ModelKind) -> Result<ForecastModel> {
        let path = self.path_for(kind);
        let model = match kind {
            ModelKind::Sarima => ForecastModel::Sarima(read_json::<SarimaModel>(kind, &path)?),
            ModelKind::Prophet => ForecastModel::Prophet(read_json::<ProphetModel>(kind, &path)?),
        };

        info!(kind = %kind, path = %path.display(), "Model loaded");
        Ok(model)
    }

    /// Persist a fitted model at its conventional path
    pub fn save(&self, model: &ForecastModel) -> Result<PathBuf> {
        let kind = model.kind();
        let path = self.path_for(kind);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let writer = BufWriter::new(File::create(&path)?);
        match model {
            ForecastModel::Sarima(m) => write_json(writer, m)?,
            ForecastModel::Prophet(m) => write_json(writer, m)?,
        }
        Ok(path)
    }
}

fn read_json<T: DeserializeOwned>(kind: ModelKind, path: &Path) -> Result<T> {
    let load_error = |source: Box<dyn std::error::Error + Send + Sync>| ForecastError::ModelLoad {
        kind,
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|e| load_error(Box::new(e)))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| load_error(Box::new(e)))
}

fn write_json<T: Serialize>(writer: BufWriter<File>, model: &T) -> Result<()> {
    serde_json::to_writer_pretty(writer, model)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_follow_kind() {
        let store = ModelStore::new("models");
        assert_eq!(
            store.path_for(ModelKind::Sarima),
            PathBuf::from("models/sarima/sarima_model.json")
        );
        assert_eq!(
            store.path_for(ModelKind::Prophet),
            PathBuf::from("models/prophet/prophet_model.json")
        );
    }

    #[test]
    fn test_missing_file_is_model_load_error() {
        let store = ModelStore::new("/nonexistent/models");
        let err = store.load(ModelKind::Prophet).unwrap_err();

        match err {
            ForecastError::ModelLoad { kind, path, .. } => {
                assert_eq!(kind, ModelKind::Prophet);
                assert!(path.ends_with("prophet/prophet_model.json"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
