//! Error types for the conversation crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `SessionError`: Errors from session storage
//! - `ConversationError`: High-level wrapper for context

use rusgo_core::UserId;
use std::fmt;

/// Errors from session storage operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Storage operation failed.
    StorageFailed { reason: String },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StorageFailed { reason } => {
                write!(f, "session storage failed: {reason}")
            }
        }
    }
}

impl std::error::Error for SessionError {}

/// High-level conversation errors.
///
/// Use these to add context when wrapping lower-level errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationError {
    /// Session lookup or refresh context (use as context wrapper).
    SessionRefresh { user_id: UserId },
    /// Transcript mutation context (use as context wrapper).
    TranscriptUpdate { user_id: UserId },
}

impl fmt::Display for ConversationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionRefresh { user_id } => {
                write!(f, "failed to load session for {user_id}")
            }
            Self::TranscriptUpdate { user_id } => {
                write!(f, "failed to update transcript for {user_id}")
            }
        }
    }
}

impl std::error::Error for ConversationError {}
