//! Error types for the integration crate.

use std::fmt;

/// Errors from external service clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectorError {
    /// Connection to service failed.
    ConnectionFailed { service: String, reason: String },
    /// Service answered with a non-success status.
    RequestFailed { service: String, status: u16 },
    /// Rate limit exceeded.
    RateLimited { service: String },
    /// Response did not have the expected shape.
    ProtocolError { service: String, reason: String },
    /// Timeout waiting for response.
    Timeout { service: String },
    /// Client could not be configured.
    InvalidConfig { reason: String },
}

impl ConnectorError {
    /// Classifies a transport-level reqwest failure.
    #[must_use]
    pub fn from_transport(service: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                service: service.to_string(),
            }
        } else if err.is_decode() {
            Self::ProtocolError {
                service: service.to_string(),
                reason: err.to_string(),
            }
        } else {
            Self::ConnectionFailed {
                service: service.to_string(),
                reason: err.to_string(),
            }
        }
    }

    /// Classifies a non-success HTTP status.
    #[must_use]
    pub fn from_status(service: &str, status: u16) -> Self {
        if status == 429 {
            Self::RateLimited {
                service: service.to_string(),
            }
        } else {
            Self::RequestFailed {
                service: service.to_string(),
                status,
            }
        }
    }
}

impl fmt::Display for ConnectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionFailed { service, reason } => {
                write!(f, "connection to {service} failed: {reason}")
            }
            Self::RequestFailed { service, status } => {
                write!(f, "{service} request failed with HTTP {status}")
            }
            Self::RateLimited { service } => write!(f, "{service} rate limited"),
            Self::ProtocolError { service, reason } => {
                write!(f, "unexpected {service} response: {reason}")
            }
            Self::Timeout { service } => write!(f, "{service} request timed out"),
            Self::InvalidConfig { reason } => {
                write!(f, "invalid client configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for ConnectorError {}
