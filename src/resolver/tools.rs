//! Lookup tools available to the reasoning loop

use super::places::PlaceProvider;
use crate::error::AppError;
use crate::http::{client_with_timeout, ensure_success, PROVIDER_TIMEOUT};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;

pub const NO_SEARCH_RESULT: &str = "No good search result found";
pub const NO_PLACES: &str = "No places found";

const MAX_ORGANIC_RESULTS: usize = 3;
const MAX_PLACE_CANDIDATES: usize = 5;

/// A named lookup the backend can request
#[async_trait]
pub trait LookupTool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// Run the lookup and return an observation for the backend
    async fn invoke(&self, input: &str) -> Result<String, AppError>;
}

/// Web search through SerpAPI
pub struct SerpApiSearch {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SerpApiSearch {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, AppError> {
        Ok(Self {
            client: client_with_timeout(PROVIDER_TIMEOUT)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

/// Pick the most useful text out of a SerpAPI response
fn summarize_serp(body: &Value) -> String {
    let text = |v: &Value, key: &str| v.get(key).and_then(Value::as_str).map(str::to_string);

    if let Some(answer_box) = body.get("answer_box") {
        if let Some(found) = text(answer_box, "answer")
            .or_else(|| text(answer_box, "snippet"))
            .or_else(|| text(answer_box, "title"))
        {
            return found;
        }
    }

    if let Some(graph) = body.get("knowledge_graph") {
        let title = text(graph, "title");
        let description = text(graph, "description");
        match (title, description) {
            (Some(t), Some(d)) => return format!("{}: {}", t, d),
            (Some(t), None) => return t,
            (None, Some(d)) => return d,
            (None, None) => {}
        }
    }

    let organic: Vec<String> = body
        .get("organic_results")
        .and_then(Value::as_array)
        .map(|results| {
            results
                .iter()
                .take(MAX_ORGANIC_RESULTS)
                .filter_map(|r| match (text(r, "title"), text(r, "snippet")) {
                    (Some(t), Some(s)) => Some(format!("{}: {}", t, s)),
                    (Some(t), None) => Some(t),
                    (None, s) => s,
                })
                .collect()
        })
        .unwrap_or_default();

    if organic.is_empty() {
        NO_SEARCH_RESULT.to_string()
    } else {
        organic.join("\n")
    }
}

#[async_trait]
impl LookupTool for SerpApiSearch {
    fn name(&self) -> &str {
        "Search"
    }

    fn description(&self) -> &str {
        "useful for when you need to retrieve the name of a location (restaurant, bar, coffee shop, cafe)"
    }

    async fn invoke(&self, input: &str) -> Result<String, AppError> {
        let url = format!("{}/search.json", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", input), ("api_key", self.api_key.as_str()), ("engine", "google")])
            .send()
            .await?;
        let response = ensure_success(response, "SerpAPI").await?;
        let body: Value = response.json().await?;

        if let Some(error) = body.get("error").and_then(Value::as_str) {
            return Err(AppError::ProviderError(format!("SerpAPI: {}", error)));
        }
        Ok(summarize_serp(&body))
    }
}

/// Candidate lookup against the place provider
pub struct PlaceSearchTool {
    places: Arc<dyn PlaceProvider>,
    category: String,
    locality: String,
}

impl PlaceSearchTool {
    pub fn new(places: Arc<dyn PlaceProvider>, category: &str, locality: &str) -> Self {
        Self {
            places,
            category: category.to_string(),
            locality: locality.to_string(),
        }
    }
}

#[async_trait]
impl LookupTool for PlaceSearchTool {
    fn name(&self) -> &str {
        "Places"
    }

    fn description(&self) -> &str {
        "useful for checking which establishments with a similar name exist in the city"
    }

    async fn invoke(&self, input: &str) -> Result<String, AppError> {
        let candidates = self
            .places
            .search_candidates(input, &self.category, &self.locality)
            .await?;
        if candidates.is_empty() {
            return Ok(NO_PLACES.to_string());
        }

        Ok(candidates
            .into_iter()
            .take(MAX_PLACE_CANDIDATES)
            .map(|c| match c.address {
                Some(address) => format!("{} ({})", c.name, address),
                None => c.name,
            })
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::places::PlaceCandidate;
    use crate::testing::FakePlaces;
    use mockito::Matcher;
    use serde_json::json;

    #[test]
    fn test_summarize_prefers_answer_box() {
        let body = json!({
            "answer_box": {"answer": "McDonald's"},
            "knowledge_graph": {"title": "Burger King"}
        });
        assert_eq!(summarize_serp(&body), "McDonald's");
    }

    #[test]
    fn test_summarize_knowledge_graph_then_organic() {
        let graph = json!({"knowledge_graph": {"title": "Szimpla Kert", "description": "Ruin bar"}});
        assert_eq!(summarize_serp(&graph), "Szimpla Kert: Ruin bar");

        let organic = json!({"organic_results": [
            {"title": "Bors GasztroBár", "snippet": "Soups and baguettes"},
            {"title": "Bors on TripAdvisor"}
        ]});
        assert_eq!(
            summarize_serp(&organic),
            "Bors GasztroBár: Soups and baguettes\nBors on TripAdvisor"
        );

        assert_eq!(summarize_serp(&json!({})), NO_SEARCH_RESULT);
    }

    #[tokio::test]
    async fn test_serpapi_invoke() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/search.json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "mcdnalds budapest".into()),
                Matcher::UrlEncoded("engine".into(), "google".into()),
            ]))
            .with_status(200)
            .with_body(json!({"answer_box": {"snippet": "McDonald's Oktogon"}}).to_string())
            .create_async()
            .await;

        let tool = SerpApiSearch::new(&server.url(), "serp-key").unwrap();
        assert_eq!(tool.invoke("mcdnalds budapest").await.unwrap(), "McDonald's Oktogon");
    }

    #[tokio::test]
    async fn test_serpapi_error_field() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/search.json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"error": "Invalid API key"}).to_string())
            .create_async()
            .await;

        let tool = SerpApiSearch::new(&server.url(), "bad").unwrap();
        let err = tool.invoke("x").await.unwrap_err();
        assert_eq!(err.error_code(), "provider_error");
    }

    #[tokio::test]
    async fn test_place_search_tool_lists_candidates() {
        let places = FakePlaces::new().with_candidates(vec![
            PlaceCandidate {
                id: "1".to_string(),
                name: "Szimpla Kert".to_string(),
                address: Some("Kazinczy u. 14".to_string()),
            },
            PlaceCandidate {
                id: "2".to_string(),
                name: "Szimpla Farmers Market".to_string(),
                address: None,
            },
        ]);
        let tool = PlaceSearchTool::new(Arc::new(places), "restaurants", "budapest");
        assert_eq!(
            tool.invoke("szimpla").await.unwrap(),
            "Szimpla Kert (Kazinczy u. 14)\nSzimpla Farmers Market"
        );

        let empty = PlaceSearchTool::new(Arc::new(FakePlaces::new()), "restaurants", "budapest");
        assert_eq!(empty.invoke("nothing").await.unwrap(), NO_PLACES);
    }
}
