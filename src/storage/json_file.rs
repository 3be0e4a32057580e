//! JSON file store
//!
//! Keeps every record in one pretty-printed array. Writers take an exclusive
//! lock on a sibling `.lock` file, write a `.tmp` file, then rename it over
//! the previous file.

use super::EstablishmentStore;
use crate::error::AppError;
use crate::model::EstablishmentRecord;
use async_trait::async_trait;
use fs2::FileExt;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("json.lock")
    }

    fn read_rows(path: &Path) -> Result<Vec<Value>, AppError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Array(rows)) => Ok(rows),
            Ok(_) => Err(AppError::StorageError(format!(
                "{} does not contain a JSON array",
                path.display()
            ))),
            Err(e) => Err(AppError::StorageError(format!(
                "{} is not valid JSON: {}",
                path.display(),
                e
            ))),
        }
    }

    fn append_blocking(&self, row: Value) -> Result<usize, AppError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
                info!("Created store directory: {}", parent.display());
            }
        }

        let lock_file = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())?;
        lock_file.lock_exclusive()?;

        let mut rows = Self::read_rows(&self.path)?;
        rows.push(row);

        let text = serde_json::to_string_pretty(&rows)
            .map_err(|e| AppError::StorageError(e.to_string()))?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, text)?;
        fs::rename(&tmp_path, &self.path)?;

        lock_file.unlock()?;
        Ok(rows.len())
    }

    fn read_blocking(&self) -> Result<Vec<Value>, AppError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let lock_file = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())?;
        lock_file.lock_shared()?;
        let rows = Self::read_rows(&self.path);
        lock_file.unlock()?;
        rows
    }
}

#[async_trait]
impl EstablishmentStore for JsonFileStore {
    async fn insert_one(&self, record: &EstablishmentRecord) -> Result<(), AppError> {
        let row = serde_json::to_value(record)
            .map_err(|e| AppError::StorageError(e.to_string()))?;
        let store = Self::new(self.path.clone());
        let count = tokio::task::spawn_blocking(move || store.append_blocking(row))
            .await
            .map_err(|e| AppError::Internal(format!("store task failed: {}", e)))??;
        debug!("Stored '{}' in {} ({} records)", record.name, self.path.display(), count);
        Ok(())
    }

    async fn select_all(&self) -> Result<Vec<Value>, AppError> {
        let store = Self::new(self.path.clone());
        tokio::task::spawn_blocking(move || store.read_blocking())
            .await
            .map_err(|e| AppError::Internal(format!("store task failed: {}", e)))?
    }
}
