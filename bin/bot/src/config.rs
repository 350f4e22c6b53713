//! Centralized bot configuration.
//!
//! Loaded via the `config` crate from environment variables. Nested keys use
//! a double underscore, e.g. `SESSION__TTL_MINUTES`.

use chrono::Duration;
use config::{ConfigError, Environment};
use rusgo_ai::LlmBackendConfig;
use rusgo_conversation::SessionPolicy;
use serde::Deserialize;

/// Bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Telegram bot token.
    pub telegram_token: String,

    /// Completion service API key.
    pub openai_api_key: String,

    /// Places search API key.
    pub yandex_api_key: String,

    #[serde(default)]
    pub completion: CompletionConfig,

    #[serde(default)]
    pub session: SessionConfig,

    /// Timeout applied to every outbound HTTP call, in seconds.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

/// Completion service settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of an OpenAI-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

/// Session settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Idle time after which a session is replaced.
    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: i64,

    /// Maximum non-system entries kept per transcript. 0 keeps everything;
    /// otherwise at least 2, so one question and its answer fit.
    #[serde(default = "default_max_history")]
    pub max_history: usize,
}

fn default_http_timeout_secs() -> u64 {
    60
}

fn default_model() -> String {
    LlmBackendConfig::DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    LlmBackendConfig::OPENAI_BASE_URL.to_string()
}

fn default_ttl_minutes() -> i64 {
    SessionPolicy::DEFAULT_TTL_MINUTES
}

fn default_max_history() -> usize {
    SessionPolicy::DEFAULT_MAX_HISTORY
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: default_ttl_minutes(),
            max_history: default_max_history(),
        }
    }
}

impl BotConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(Environment::default())
    }

    /// Loads configuration from an explicit variable map instead of the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self::load(Environment::default().source(Some(vars)))
    }

    fn load(environment: Environment) -> Result<Self, ConfigError> {
        let config: Self = config::Config::builder()
            .add_source(environment.separator("__").try_parsing(true))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects blank secrets and nonsensical limits.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("TELEGRAM_TOKEN", &self.telegram_token),
            ("OPENAI_API_KEY", &self.openai_api_key),
            ("YANDEX_API_KEY", &self.yandex_api_key),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Message(format!("{key} must not be empty")));
            }
        }

        if self.session.ttl_minutes <= 0 {
            return Err(ConfigError::Message(
                "SESSION__TTL_MINUTES must be positive".to_string(),
            ));
        }

        if self.session.max_history == 1 {
            return Err(ConfigError::Message(
                "SESSION__MAX_HISTORY must be 0 or at least 2".to_string(),
            ));
        }

        if self.http_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "HTTP_TIMEOUT_SECS must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Session rules derived from this configuration.
    #[must_use]
    pub fn session_policy(&self) -> SessionPolicy {
        SessionPolicy::new(
            Duration::minutes(self.session.ttl_minutes),
            self.session.max_history,
        )
    }

    /// Completion client settings derived from this configuration.
    #[must_use]
    pub fn completion_backend(&self) -> LlmBackendConfig {
        LlmBackendConfig::openai(&self.openai_api_key, &self.completion.model)
            .with_base_url(&self.completion.base_url)
            .with_timeout_secs(self.http_timeout_secs)
    }

    /// Timeout for outbound HTTP calls.
    #[must_use]
    pub fn http_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.http_timeout_secs)
    }
}
