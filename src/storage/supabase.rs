//! Supabase (PostgREST) table store

use super::EstablishmentStore;
use crate::error::AppError;
use crate::http::{client_with_timeout, PROVIDER_TIMEOUT};
use crate::model::EstablishmentRecord;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;

pub struct SupabaseStore {
    client: Client,
    table_url: String,
    api_key: String,
}

impl SupabaseStore {
    pub fn new(project_url: &str, api_key: &str, table: &str) -> Result<Self, AppError> {
        Ok(Self {
            client: client_with_timeout(PROVIDER_TIMEOUT)?,
            table_url: format!("{}/rest/v1/{}", project_url.trim_end_matches('/'), table),
            api_key: api_key.to_string(),
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn check(response: Response, action: &str) -> Result<Response, AppError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::StorageError(format!(
            "Supabase {} failed with {}: {}",
            action, status, body
        )))
    }
}

fn storage_err(e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        AppError::Timeout(e.to_string())
    } else {
        AppError::StorageError(e.to_string())
    }
}

#[async_trait]
impl EstablishmentStore for SupabaseStore {
    async fn insert_one(&self, record: &EstablishmentRecord) -> Result<(), AppError> {
        let response = self
            .authorized(self.client.post(&self.table_url))
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await
            .map_err(storage_err)?;
        Self::check(response, "insert").await?;
        debug!("Inserted '{}' into {}", record.name, self.table_url);
        Ok(())
    }

    async fn select_all(&self) -> Result<Vec<Value>, AppError> {
        let response = self
            .authorized(self.client.get(&self.table_url))
            .query(&[("select", "*")])
            .send()
            .await
            .map_err(storage_err)?;
        let response = Self::check(response, "select").await?;
        let rows: Vec<Value> = response
            .json()
            .await
            .map_err(|e| AppError::StorageError(format!("unexpected select response: {}", e)))?;
        Ok(rows)
    }
}
