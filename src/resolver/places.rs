//! Place provider
//!
//! Finds a place identifier for a canonical name and fetches its details.
//! TripAdvisor's content API is the production implementation.

use crate::error::AppError;
use crate::http::{client_with_timeout, ensure_success, PROVIDER_TIMEOUT};
use crate::model::{parse_weekday_text, EstablishmentRecord, UNKNOWN};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

const DETAIL_FIELDS: &str =
    "name,description,address_obj,website,rating,phone,latitude,longitude,cuisine,category,hours";

/// A search hit
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceCandidate {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
}

/// Details as reported by a provider, every field optional
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceDetails {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub rating: Option<f64>,
    pub cuisines: Vec<String>,
    pub category: Option<String>,
    pub weekday_text: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl PlaceDetails {
    /// Build a normalized record, filling absent fields with the sentinel
    pub fn into_record(self, fallback_name: &str) -> EstablishmentRecord {
        fn text(value: Option<String>) -> String {
            value
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN.to_string())
        }

        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| fallback_name.to_string());

        EstablishmentRecord {
            name,
            description: text(self.description),
            address: text(self.address),
            website: text(self.website),
            phone: text(self.phone),
            rating: self.rating,
            cuisines: self.cuisines,
            category: text(self.category),
            opening_hours: parse_weekday_text(&self.weekday_text),
            latitude: self.latitude,
            longitude: self.longitude,
        }
        .normalized()
    }
}

#[async_trait]
pub trait PlaceProvider: Send + Sync {
    /// Candidates for a query, best first
    async fn search_candidates(
        &self,
        query: &str,
        category: &str,
        locality: &str,
    ) -> Result<Vec<PlaceCandidate>, AppError>;

    async fn fetch_details(&self, place_id: &str) -> Result<PlaceDetails, AppError>;

    /// Identifier of the best candidate, if any
    async fn search(&self, query: &str, category: &str, locality: &str) -> Result<Option<String>, AppError> {
        let candidates = self.search_candidates(query, category, locality).await?;
        Ok(candidates.into_iter().next().map(|c| c.id))
    }
}

// TripAdvisor wire types

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(deserialize_with = "de_id")]
    location_id: String,
    #[serde(default)]
    name: String,
    address_obj: Option<AddressObj>,
}

#[derive(Debug, Deserialize)]
struct AddressObj {
    address_string: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NamedValue {
    name: Option<String>,
    localized_name: Option<String>,
}

impl NamedValue {
    fn label(self) -> Option<String> {
        self.localized_name.or(self.name)
    }
}

#[derive(Debug, Deserialize)]
struct Hours {
    #[serde(default)]
    weekday_text: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    name: Option<String>,
    description: Option<String>,
    address_obj: Option<AddressObj>,
    website: Option<String>,
    phone: Option<String>,
    #[serde(default, deserialize_with = "de_loose_number")]
    rating: Option<f64>,
    #[serde(default, deserialize_with = "de_loose_number")]
    latitude: Option<f64>,
    #[serde(default, deserialize_with = "de_loose_number")]
    longitude: Option<f64>,
    #[serde(default)]
    cuisine: Vec<NamedValue>,
    category: Option<NamedValue>,
    hours: Option<Hours>,
}

fn de_id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match Value::deserialize(d)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("unexpected location_id {}", other))),
    }
}

fn de_loose_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

impl From<DetailsResponse> for PlaceDetails {
    fn from(r: DetailsResponse) -> Self {
        PlaceDetails {
            name: r.name,
            description: r.description,
            address: r.address_obj.and_then(|a| a.address_string),
            website: r.website,
            phone: r.phone,
            rating: r.rating,
            cuisines: r.cuisine.into_iter().filter_map(NamedValue::label).collect(),
            category: r.category.and_then(NamedValue::label),
            weekday_text: r.hours.map(|h| h.weekday_text).unwrap_or_default(),
            latitude: r.latitude,
            longitude: r.longitude,
        }
    }
}

/// TripAdvisor content API client
pub struct TripAdvisorClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TripAdvisorClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, AppError> {
        Ok(Self {
            client: client_with_timeout(PROVIDER_TIMEOUT)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl PlaceProvider for TripAdvisorClient {
    async fn search_candidates(
        &self,
        query: &str,
        category: &str,
        locality: &str,
    ) -> Result<Vec<PlaceCandidate>, AppError> {
        let url = format!("{}/location/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("searchQuery", query),
                ("category", category),
                ("address", locality),
                ("language", "en"),
            ])
            .header("accept", "application/json")
            .send()
            .await?;
        let response = ensure_success(response, "TripAdvisor search").await?;
        let body: SearchResponse = response.json().await?;

        debug!("TripAdvisor search '{}' returned {} hits", query, body.data.len());
        Ok(body
            .data
            .into_iter()
            .map(|hit| PlaceCandidate {
                id: hit.location_id,
                name: hit.name,
                address: hit.address_obj.and_then(|a| a.address_string),
            })
            .collect())
    }

    async fn fetch_details(&self, place_id: &str) -> Result<PlaceDetails, AppError> {
        let url = format!("{}/location/{}/details", self.base_url, place_id);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("language", "en"),
                ("fields", DETAIL_FIELDS),
            ])
            .header("accept", "application/json")
            .send()
            .await?;
        let response = ensure_success(response, "TripAdvisor details").await?;
        let body: DetailsResponse = response.json().await?;
        Ok(body.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_search_returns_first_id() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/location/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("key".into(), "ta-key".into()),
                Matcher::UrlEncoded("searchQuery".into(), "Szimpla Kert".into()),
                Matcher::UrlEncoded("category".into(), "restaurants".into()),
                Matcher::UrlEncoded("address".into(), "budapest".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({"data": [
                    {"location_id": "123", "name": "Szimpla Kert", "address_obj": {"address_string": "Kazinczy u. 14"}},
                    {"location_id": 456, "name": "Szimpla Farmers Market"}
                ]})
                .to_string(),
            )
            .create_async()
            .await;

        let client = TripAdvisorClient::new(&server.url(), "ta-key").unwrap();
        let id = client.search("Szimpla Kert", "restaurants", "budapest").await.unwrap();
        assert_eq!(id.as_deref(), Some("123"));

        let candidates = client
            .search_candidates("Szimpla Kert", "restaurants", "budapest")
            .await
            .unwrap();
        assert_eq!(candidates[1].id, "456");
        assert_eq!(candidates[0].address.as_deref(), Some("Kazinczy u. 14"));
    }

    #[tokio::test]
    async fn test_search_without_hits() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/location/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"data": []}).to_string())
            .create_async()
            .await;

        let client = TripAdvisorClient::new(&server.url(), "ta-key").unwrap();
        assert_eq!(client.search("nowhere", "restaurants", "budapest").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_search_failure_is_provider_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/location/search")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let client = TripAdvisorClient::new(&server.url(), "ta-key").unwrap();
        let err = client.search("x", "restaurants", "budapest").await.unwrap_err();
        assert_eq!(err.error_code(), "provider_error");
    }

    #[tokio::test]
    async fn test_details_map_to_record() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/location/123/details")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!({
                    "name": "Szimpla Kert",
                    "address_obj": {"address_string": "Kazinczy u. 14, Budapest"},
                    "website": "https://szimpla.hu",
                    "rating": "4.5",
                    "latitude": "47.4970",
                    "longitude": 19.0633,
                    "cuisine": [{"name": "bar", "localized_name": "Bar"}, {"name": "pub"}],
                    "category": {"name": "restaurant", "localized_name": "Restaurant"},
                    "hours": {"weekday_text": ["Monday: 12:00 - 04:00", "Tuesday: 12:00 - 04:00"]}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = TripAdvisorClient::new(&server.url(), "ta-key").unwrap();
        let record = client.fetch_details("123").await.unwrap().into_record("fallback");

        assert_eq!(record.name, "szimpla kert");
        assert_eq!(record.rating, Some(4.5));
        assert_eq!(record.latitude, Some(47.497));
        assert_eq!(record.cuisines, vec!["bar", "pub"]);
        assert_eq!(record.category, "restaurant");
        assert_eq!(record.opening_hours.get("monday").map(String::as_str), Some("12:00 - 04:00"));
        // absent upstream
        assert_eq!(record.phone, UNKNOWN);
        assert_eq!(record.description, UNKNOWN);
    }

    #[test]
    fn test_missing_name_uses_fallback() {
        let record = PlaceDetails::default().into_record("Bors GasztroBár");
        assert_eq!(record.name, "bors gasztrobár");
        assert_eq!(record.website, UNKNOWN);
        assert!(record.opening_hours.is_empty());
    }
}
