//! Session storage.

use crate::error::SessionError;
use crate::session::Session;
use async_trait::async_trait;
use rusgo_core::UserId;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Trait for session storage, keyed by user.
///
/// A user has at most one current session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Gets the current session of a user.
    async fn get(&self, user_id: UserId) -> rusgo_core::Result<Option<Session>, SessionError>;

    /// Stores `session` as the current session of its user.
    async fn put(&self, session: Session) -> rusgo_core::Result<(), SessionError>;
}

/// Process-local session store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<UserId, Session>>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of users with a session.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Returns true if no session has been stored yet.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, user_id: UserId) -> rusgo_core::Result<Option<Session>, SessionError> {
        Ok(self.sessions.read().await.get(&user_id).cloned())
    }

    async fn put(&self, session: Session) -> rusgo_core::Result<(), SessionError> {
        self.sessions.write().await.insert(session.user_id, session);
        Ok(())
    }
}
