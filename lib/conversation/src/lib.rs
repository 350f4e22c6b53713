//! Conversation service for the rusgo assistant bot.
//!
//! This crate provides:
//!
//! - **Session Manager**: per-user session lifecycle with time-based expiry
//! - **Session Store**: keyed storage for sessions
//! - **Language Store**: per-user reply language preferences

pub mod error;
pub mod language;
pub mod lock;
pub mod manager;
pub mod message;
pub mod session;
pub mod store;

pub use error::{ConversationError, SessionError};
pub use language::{InMemoryLanguageStore, LanguageStore};
pub use lock::{KeyedGuard, KeyedLock};
pub use manager::SessionManager;
pub use message::{Message, MessageRole};
pub use session::{Session, SessionPolicy};
pub use store::{InMemorySessionStore, SessionStore};
