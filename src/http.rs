//! HTTP client utilities
//!
//! Provides the reqwest::Client shared by every provider and store

use crate::error::AppError;
use reqwest::{Client, Response};
use std::time::Duration;

/// Timeout applied to each provider request
pub const PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Build a reqwest Client with the given timeout
///
/// Proxy environment variables (HTTP_PROXY, HTTPS_PROXY, NO_PROXY) are
/// honored by reqwest itself.
pub fn client_with_timeout(timeout: Duration) -> Result<Client, AppError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("eatlist/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))
}

/// Turn a non-success response into a ProviderError carrying its body
pub async fn ensure_success(response: Response, what: &str) -> Result<Response, AppError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    Err(AppError::ProviderError(format!(
        "{} returned {}: {}",
        what,
        status,
        truncate(&text, 200)
    )))
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}…", cut)
}
