//! Text translation.
//!
//! The bot only ever translates between Russian and the user's chosen
//! language, with source auto-detection for inbound text.

use crate::error::ConnectorError;
use async_trait::async_trait;
use reqwest::Client;
use rusgo_core::Language;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::instrument;

const SERVICE: &str = "google-translate";

/// Source language of a translation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLanguage {
    /// Let the service detect the language.
    Auto,
    /// A known language.
    Known(Language),
}

impl SourceLanguage {
    /// Returns the code sent to the service.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Known(language) => language.code(),
        }
    }
}

impl From<Language> for SourceLanguage {
    fn from(language: Language) -> Self {
        Self::Known(language)
    }
}

/// Trait for translation services.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translates `text` into `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the service call fails.
    async fn translate(
        &self,
        text: &str,
        source: SourceLanguage,
        target: Language,
    ) -> Result<String, ConnectorError>;
}

/// Client for the public Google Translate web endpoint.
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
}

impl GoogleTranslator {
    /// Default endpoint.
    pub const ENDPOINT: &'static str = "https://translate.googleapis.com/translate_a/single";

    /// Creates a client for the default endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, ConnectorError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConnectorError::InvalidConfig {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
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
impl Translator for GoogleTranslator {
    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    async fn translate(
        &self,
        text: &str,
        source: SourceLanguage,
        target: Language,
    ) -> Result<String, ConnectorError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source.code()),
                ("tl", target.code()),
                ("dt", "t"),
                ("q", text),
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

        parse_translation(&body)
    }
}

/// Joins the translated segments of a `translate_a/single` response.
///
/// The body looks like `[[["Привет", "Salom", ...], ...], ...]`.
///
/// # Errors
///
/// Returns an error if the body has no segment list.
pub fn parse_translation(body: &JsonValue) -> Result<String, ConnectorError> {
    let segments = body
        .get(0)
        .and_then(JsonValue::as_array)
        .ok_or_else(|| ConnectorError::ProtocolError {
            service: SERVICE.to_string(),
            reason: "missing translation segments".to_string(),
        })?;

    Ok(segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(JsonValue::as_str))
        .collect())
}
