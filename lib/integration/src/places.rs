//! Places search.
//!
//! Looks up businesses for a free-text query. Listings come back with
//! optional fields; missing ones are replaced with placeholders instead of
//! failing the whole search.

use crate::error::ConnectorError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::{debug, instrument};

const SERVICE: &str = "yandex-maps";

/// Shown when a listing has no address.
pub const UNKNOWN_ADDRESS: &str = "Адрес неизвестен";

/// Maximum number of listings considered per search.
pub const MAX_RESULTS: usize = 3;

/// A business listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Place {
    /// Business name.
    pub name: String,
    /// Postal address, or [`UNKNOWN_ADDRESS`].
    pub address: String,
    /// First listed phone number, or empty.
    pub phone: String,
}

/// Trait for places search services.
#[async_trait]
pub trait PlacesSearch: Send + Sync {
    /// Returns at most [`MAX_RESULTS`] listings for `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the service call fails.
    async fn search(&self, query: &str) -> Result<Vec<Place>, ConnectorError>;
}

/// Client for the Yandex Maps organisation search API.
#[derive(Debug, Clone)]
pub struct YandexPlaces {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl YandexPlaces {
    /// Default endpoint.
    pub const ENDPOINT: &'static str = "https://search-maps.yandex.ru/v1/";

    /// Creates a client for the default endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is blank or the HTTP client cannot
    /// be built.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, ConnectorError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ConnectorError::InvalidConfig {
                reason: "places api key is empty".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConnectorError::InvalidConfig {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key,
            endpoint: Self::ENDPOINT.to_string(),
        })
    }

    /// Overrides the endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl PlacesSearch for YandexPlaces {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<Place>, ConnectorError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("text", query),
                ("type", "biz"),
                ("lang", "ru_RU"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ConnectorError::from_transport(SERVICE, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConnectorError::from_status(SERVICE, status.as_u16()));
        }

        let body: JsonValue = response
            .json()
            .await
            .map_err(|e| ConnectorError::from_transport(SERVICE, &e))?;

        let places = parse_places(&body, MAX_RESULTS);
        debug!(found = places.len(), "places search finished");
        Ok(places)
    }
}

/// Extracts listings from the first `limit` entries of `features`.
///
/// A feature without a company name is skipped. A missing `features` list
/// yields no listings.
#[must_use]
pub fn parse_places(body: &JsonValue, limit: usize) -> Vec<Place> {
    let Some(features) = body.get("features").and_then(JsonValue::as_array) else {
        return Vec::new();
    };

    features
        .iter()
        .take(limit)
        .filter_map(|feature| {
            let meta = feature.get("properties")?.get("CompanyMetaData")?;
            let name = meta.get("name")?.as_str()?;
            let address = meta
                .get("address")
                .and_then(JsonValue::as_str)
                .unwrap_or(UNKNOWN_ADDRESS);
            let phone = meta
                .get("Phones")
                .and_then(|phones| phones.get(0))
                .and_then(|phone| phone.get("formatted"))
                .and_then(JsonValue::as_str)
                .unwrap_or_default();

            Some(Place {
                name: name.to_string(),
                address: address.to_string(),
                phone: phone.to_string(),
            })
        })
        .collect()
}
