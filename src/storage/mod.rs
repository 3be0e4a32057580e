//! Establishment persistence
//!
//! Records are appended once and read back in bulk. Rows come back as raw
//! JSON so the search side can skip malformed ones instead of failing.

pub mod json_file;
pub mod supabase;

pub use json_file::JsonFileStore;
pub use supabase::SupabaseStore;

use crate::config::{require, Settings, StoreKind};
use crate::error::AppError;
use crate::model::EstablishmentRecord;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

#[async_trait]
pub trait EstablishmentStore: Send + Sync {
    async fn insert_one(&self, record: &EstablishmentRecord) -> Result<(), AppError>;
    async fn select_all(&self) -> Result<Vec<Value>, AppError>;
}

/// Build the store selected by `EATLIST_STORE`
pub fn from_settings(settings: &Settings) -> Result<Arc<dyn EstablishmentStore>, AppError> {
    Ok(match settings.store {
        StoreKind::Json => Arc::new(JsonFileStore::new(settings.store_path.clone())),
        StoreKind::Supabase => Arc::new(SupabaseStore::new(
            require(&settings.supabase_url, "SUPABASE_URL")?,
            require(&settings.supabase_key, "SUPABASE_KEY")?,
            &settings.supabase_table,
        )?),
        StoreKind::Memory => Arc::new(MemoryStore::new()),
    })
}

/// Process-local store, lost on exit
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<Value>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }
}

#[async_trait]
impl EstablishmentStore for MemoryStore {
    async fn insert_one(&self, record: &EstablishmentRecord) -> Result<(), AppError> {
        let row = serde_json::to_value(record)
            .map_err(|e| AppError::StorageError(e.to_string()))?;
        self.rows.lock().await.push(row);
        Ok(())
    }

    async fn select_all(&self) -> Result<Vec<Value>, AppError> {
        Ok(self.rows.lock().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_appends() {
        let store = MemoryStore::new();
        store.insert_one(&EstablishmentRecord::new("szimpla kert")).await.unwrap();
        store.insert_one(&EstablishmentRecord::new("szimpla kert")).await.unwrap();

        let rows = store.select_all().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["name"], "szimpla kert");
    }

    #[test]
    fn test_supabase_store_needs_credentials() {
        let mut settings = Settings::from_lookup(|_| None).unwrap();
        settings.store = StoreKind::Supabase;
        let err = from_settings(&settings).err().unwrap();
        assert_eq!(err.error_code(), "config_error");

        settings.store = StoreKind::Memory;
        assert!(from_settings(&settings).is_ok());
    }
}
