//! Establishment resolution
//!
//! Turns free text such as `"mcdnalds"` into a complete, normalized
//! establishment record in three steps: name resolution through the
//! reasoning loop, place search, then detail lookup.

pub mod agent;
pub mod chat;
pub mod grammar;
pub mod places;
pub mod tools;

pub use agent::{AgentStep, AgentTurn, NameResolver, ReasoningBackend, ToolSpec};
pub use places::{PlaceCandidate, PlaceDetails, PlaceProvider, TripAdvisorClient};
pub use tools::{LookupTool, PlaceSearchTool, SerpApiSearch};

use crate::config::{require, Settings};
use crate::error::AppError;
use crate::model::EstablishmentRecord;
use chat::ChatBackend;
use std::sync::Arc;
use tracing::{info, warn};

/// Full add pipeline up to, but not including, persistence
pub struct Resolver {
    names: NameResolver,
    places: Arc<dyn PlaceProvider>,
    category: String,
    locality: String,
}

impl Resolver {
    pub fn new(names: NameResolver, places: Arc<dyn PlaceProvider>, category: &str, locality: &str) -> Self {
        Self {
            names,
            places,
            category: category.to_string(),
            locality: locality.to_string(),
        }
    }

    /// Wire the chat backend, lookup tools and TripAdvisor from settings
    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        let openai_key = require(&settings.openai_api_key, "OPENAI_API_KEY")?;
        let tripadvisor_key = require(&settings.tripadvisor_api_key, "TRIPADVISOR_API_KEY")?;

        let places: Arc<dyn PlaceProvider> = Arc::new(TripAdvisorClient::new(
            &settings.tripadvisor_base_url,
            tripadvisor_key,
        )?);

        let mut tools: Vec<Arc<dyn LookupTool>> = Vec::new();
        match settings.serpapi_api_key.as_deref() {
            Some(key) => tools.push(Arc::new(SerpApiSearch::new(&settings.serpapi_base_url, key)?)),
            None => warn!("SERPAPI_API_KEY not set, web search tool disabled"),
        }
        tools.push(Arc::new(PlaceSearchTool::new(
            places.clone(),
            &settings.category,
            &settings.city,
        )));

        let backend = Arc::new(ChatBackend::new(
            &settings.openai_base_url,
            openai_key,
            &settings.openai_model,
            settings.max_actions,
        )?);
        let names = NameResolver::new(backend, tools, settings.max_actions);

        Ok(Self::new(names, places, &settings.category, &settings.city))
    }

    /// Resolve free text to a record ready to store
    pub async fn resolve(&self, user_input: &str) -> Result<EstablishmentRecord, AppError> {
        let canonical = self.names.resolve(user_input).await?;

        let place_id = self
            .places
            .search(&canonical, &self.category, &self.locality)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "no {} named '{}' in {}",
                    self.category, canonical, self.locality
                ))
            })?;
        info!("Place id for '{}' is {}", canonical, place_id);

        let details = self.places.fetch_details(&place_id).await?;
        Ok(details.into_record(&canonical))
    }
}
