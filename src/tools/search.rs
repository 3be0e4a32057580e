//! Search tool implementation
//!
//! Implements the `search_establishments(term)` tool

use super::{with_deadline, Services};
use crate::cli::SearchArgs;
use crate::error::{normalize_text, validate_input, AppError};
use serde_json::Value;
use tracing::{debug, info};

/// Handle search_establishments tool call with raw MCP arguments
pub async fn handle_search(args: Value, services: &Services) -> Result<String, AppError> {
    let search_args: SearchArgs = serde_json::from_value(args)
        .map_err(|e| AppError::InvalidInput(format!("Invalid arguments: {}", e)))?;

    with_deadline("Search", execute_search(search_args, services)).await
}

/// Execute search tool (shared implementation for MCP, CLI and HTTP)
pub async fn execute_search(search_args: SearchArgs, services: &Services) -> Result<String, AppError> {
    validate_input("Search term", &search_args.term)?;
    let term = normalize_text(&search_args.term);
    info!("Search request for: {}", term);

    let rows = services.store.select_all().await?;
    debug!("Loaded {} stored rows", rows.len());

    // Matching is CPU-bound; keep it off the async workers so deadlines fire
    let engine = services.engine.clone();
    let text = tokio::task::spawn_blocking(move || engine.search_and_format(&term, rows))
        .await
        .map_err(|e| AppError::Internal(format!("search task failed: {}", e)))?;
    Ok(text)
}
