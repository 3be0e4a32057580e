//! Add tool implementation
//!
//! Implements the `add_establishment(name)` tool

use super::{with_deadline, Services};
use crate::cli::AddArgs;
use crate::error::{normalize_text, validate_input, AppError};
use serde_json::Value;
use tracing::info;

/// Handle add_establishment tool call with raw MCP arguments
pub async fn handle_add(args: Value, services: &Services) -> Result<String, AppError> {
    let add_args: AddArgs = serde_json::from_value(args)
        .map_err(|e| AppError::InvalidInput(format!("Invalid arguments: {}", e)))?;

    with_deadline("Add", execute_add(add_args, services)).await
}

/// Execute add tool (shared implementation for MCP, CLI and HTTP)
pub async fn execute_add(add_args: AddArgs, services: &Services) -> Result<String, AppError> {
    validate_input("Establishment name", &add_args.name)?;
    let name = normalize_text(&add_args.name);
    info!("Add request for: {}", name);

    let record = services.resolver()?.resolve(&name).await?;
    record.validate()?;
    services.store.insert_one(&record).await?;

    info!("Stored establishment '{}'", record.name);
    Ok(format!("Added {}", record.name))
}
