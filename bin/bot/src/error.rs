//! Error types for the bot's message handlers.
//!
//! Handler failures never reach the user as-is: each one is logged with its
//! full report and answered with a fixed text from [`HandlerError::user_message`].

use crate::texts::{REPLY_FAILED, SEARCH_FAILED};
use rusgo_ai::LlmError;
use rusgo_core::UserId;
use rusgo_integration::ConnectorError;
use std::fmt;

/// A failed call to one of the external services.
#[derive(Debug)]
pub enum ServiceError {
    /// The completion service failed.
    Completion(LlmError),
    /// The translation service failed.
    Translation(ConnectorError),
    /// The places search service failed.
    Places(ConnectorError),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completion(err) => write!(f, "completion failed: {err}"),
            Self::Translation(err) => write!(f, "translation failed: {err}"),
            Self::Places(err) => write!(f, "places search failed: {err}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Completion(err) => Some(err),
            Self::Translation(err) | Self::Places(err) => Some(err),
        }
    }
}

/// Handler-level context for a failed update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// Answering a general message failed.
    GeneralReply { user_id: UserId },
    /// An explicit places search failed.
    PlacesSearch { query: String },
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GeneralReply { user_id } => write!(f, "failed to answer {user_id}"),
            Self::PlacesSearch { query } => write!(f, "places search for '{query}' failed"),
        }
    }
}

impl std::error::Error for HandlerError {}

impl HandlerError {
    /// Text shown to the user instead of the error.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::GeneralReply { .. } => REPLY_FAILED,
            Self::PlacesSearch { .. } => SEARCH_FAILED,
        }
    }
}

/// Startup failures.
#[derive(Debug)]
pub enum StartupError {
    /// A service client could not be constructed.
    Client { service: &'static str },
    /// The messaging transport rejected a startup call.
    Transport,
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client { service } => write!(f, "failed to build {service} client"),
            Self::Transport => write!(f, "messaging transport unavailable"),
        }
    }
}

impl std::error::Error for StartupError {}

/// A reply could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryError {
    pub chat_id: i64,
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to deliver reply to chat {}", self.chat_id)
    }
}

impl std::error::Error for DeliveryError {}
