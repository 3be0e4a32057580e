//! Error types and handling for the eatlist server

use serde::Serialize;
use std::fmt;

/// Application error types
#[derive(Debug, Serialize)]
pub enum AppError {
    InvalidInput(String),
    /// Reasoning output matched neither the action nor the final-answer grammar
    ParseError(String),
    /// The lookup action budget ran out before a final answer
    ResolutionExhausted(String),
    NotFound(String),
    ProviderError(String),
    MalformedRecord(String),
    StorageError(String),
    ConfigError(String),
    Timeout(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AppError::ParseError(msg) => write!(f, "Could not parse reasoning output: {}", msg),
            AppError::ResolutionExhausted(msg) => write!(f, "Resolution exhausted: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::ProviderError(msg) => write!(f, "Provider error: {}", msg),
            AppError::MalformedRecord(msg) => write!(f, "Malformed record: {}", msg),
            AppError::StorageError(msg) => write!(f, "Storage error: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Get the error code for MCP and HTTP responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::ParseError(_) => "parse_error",
            AppError::ResolutionExhausted(_) => "resolution_exhausted",
            AppError::NotFound(_) => "not_found",
            AppError::ProviderError(_) => "provider_error",
            AppError::MalformedRecord(_) => "malformed_record",
            AppError::StorageError(_) => "storage_error",
            AppError::ConfigError(_) => "config_error",
            AppError::Timeout(_) => "timeout",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Process exit code used in CLI mode
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::InvalidInput(_) => 1,
            AppError::ProviderError(_) => 2,
            AppError::NotFound(_) => 3,
            AppError::Timeout(_) => 4,
            _ => 5,
        }
    }
}

/// Convert anyhow::Error to AppError
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Convert reqwest::Error to AppError
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout(err.to_string())
        } else {
            AppError::ProviderError(err.to_string())
        }
    }
}

/// Convert serde_json::Error to AppError
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::ProviderError(format!("unexpected response shape: {}", err))
    }
}

/// Convert std::io::Error to AppError
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::StorageError(err.to_string())
    }
}

const MAX_INPUT_CHARS: usize = 500;

/// Validate free text handed to the add or search pipeline
pub fn validate_input(kind: &str, text: &str) -> Result<(), AppError> {
    if text.trim().is_empty() {
        return Err(AppError::InvalidInput(format!("{} cannot be empty", kind)));
    }

    if text.chars().count() > MAX_INPUT_CHARS {
        return Err(AppError::InvalidInput(format!(
            "{} too long, maximum {} characters",
            kind, MAX_INPUT_CHARS
        )));
    }

    Ok(())
}

/// Normalize text using Unicode NFKC and trim it
pub fn normalize_text(text: &str) -> String {
    use unicode_normalization::UnicodeNormalization;
    text.nfkc().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_and_codes() {
        let err = AppError::ResolutionExhausted("3 actions used".to_string());
        assert_eq!(err.to_string(), "Resolution exhausted: 3 actions used");
        assert_eq!(err.error_code(), "resolution_exhausted");

        assert_eq!(AppError::NotFound("x".into()).exit_code(), 3);
        assert_eq!(AppError::ProviderError("x".into()).exit_code(), 2);
        assert_eq!(AppError::ParseError("x".into()).exit_code(), 5);
    }

    #[test]
    fn test_validate_input() {
        assert!(validate_input("Query", "pizza").is_ok());
        assert!(validate_input("Query", "").is_err());
        assert!(validate_input("Query", "   ").is_err());
        assert!(validate_input("Query", &"a".repeat(501)).is_err());
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  ｐｉｚｚａ  "), "pizza");
    }
}
