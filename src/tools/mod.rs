//! Tool implementations shared by MCP, CLI and HTTP

pub mod add;
pub mod search;

use crate::config::Settings;
use crate::error::AppError;
use crate::resolver::Resolver;
use crate::search::{FuzzyMatcher, SearchEngine};
use crate::storage::{self, EstablishmentStore};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Deadline for one add or search request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Run one request under [`REQUEST_TIMEOUT`]
pub async fn with_deadline<T, F>(what: &str, work: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    timeout(REQUEST_TIMEOUT, work).await.map_err(|_| {
        AppError::Timeout(format!(
            "{} request exceeded {} second timeout",
            what,
            REQUEST_TIMEOUT.as_secs()
        ))
    })?
}

/// Collaborators every request needs
pub struct Services {
    pub resolver: Option<Resolver>,
    pub store: Arc<dyn EstablishmentStore>,
    pub engine: SearchEngine,
}

impl Services {
    pub fn new(resolver: Option<Resolver>, store: Arc<dyn EstablishmentStore>, engine: SearchEngine) -> Self {
        Self {
            resolver,
            store,
            engine,
        }
    }

    /// Build from settings; a missing resolver credential only disables adding
    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        let store = storage::from_settings(settings)?;
        let engine = SearchEngine::new()
            .with_matcher(FuzzyMatcher::with_threshold(settings.fuzzy_threshold))
            .with_display_limit(settings.display_limit)
            .with_timezone(settings.timezone);

        let resolver = match Resolver::from_settings(settings) {
            Ok(resolver) => Some(resolver),
            Err(AppError::ConfigError(msg)) => {
                tracing::warn!("Adding establishments disabled: {}", msg);
                None
            }
            Err(e) => return Err(e),
        };

        Ok(Self::new(resolver, store, engine))
    }

    pub fn resolver(&self) -> Result<&Resolver, AppError> {
        self.resolver.as_ref().ok_or_else(|| {
            AppError::ConfigError(
                "OPENAI_API_KEY and TRIPADVISOR_API_KEY are required to add establishments"
                    .to_string(),
            )
        })
    }
}
