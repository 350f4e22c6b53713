//! Session lifecycle.
//!
//! The manager owns the rules that decide when a user's session is reused
//! and when it is replaced, and writes every change back to the store.

use crate::error::ConversationError;
use crate::lock::{KeyedGuard, KeyedLock};
use crate::session::{Session, SessionPolicy};
use crate::store::SessionStore;
use chrono::{DateTime, Utc};
use rootcause::prelude::ResultExt;
use rusgo_core::UserId;
use std::sync::Arc;
use tracing::debug;

/// Manages per-user session lifecycles on top of a [`SessionStore`].
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    locks: KeyedLock<UserId>,
    policy: SessionPolicy,
    system_prompt: String,
}

impl SessionManager {
    /// Creates a manager.
    #[must_use]
    pub fn new(
        store: Arc<dyn SessionStore>,
        policy: SessionPolicy,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            store,
            locks: KeyedLock::new(),
            policy,
            system_prompt: system_prompt.into(),
        }
    }

    /// Serializes work on one user's session.
    ///
    /// Hold the guard across the whole read-modify-write of a session.
    pub async fn lock(&self, user_id: UserId) -> KeyedGuard<UserId> {
        self.locks.lock(&user_id).await
    }

    /// Returns the user's session, replacing it if missing or expired.
    ///
    /// Must run before the new user message is appended.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn get_or_refresh(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> rusgo_core::Result<Session, ConversationError> {
        let existing = self
            .store
            .get(user_id)
            .await
            .context(ConversationError::SessionRefresh { user_id })?;

        match existing {
            Some(session) if !session.is_expired(now, self.policy.ttl) => Ok(session),
            previous => {
                let session = Session::new(user_id, &self.system_prompt, now);
                debug!(
                    %user_id,
                    session_id = %session.id,
                    expired = previous.is_some(),
                    "starting new session"
                );
                self.store
                    .put(session.clone())
                    .await
                    .context(ConversationError::SessionRefresh { user_id })?;
                Ok(session)
            }
        }
    }

    /// Appends a user entry, marks the session active and writes it back.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn append_user_message(
        &self,
        session: &mut Session,
        text: impl Into<String>,
        now: DateTime<Utc>,
    ) -> rusgo_core::Result<(), ConversationError> {
        session.push_user(text, now);
        self.save(session).await
    }

    /// Appends an assistant entry and writes the session back.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn append_assistant_message(
        &self,
        session: &mut Session,
        text: impl Into<String>,
    ) -> rusgo_core::Result<(), ConversationError> {
        session.push_assistant(text);
        self.save(session).await
    }

    /// Replaces the latest user entry's text and writes the session back.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn rewrite_last_user_message(
        &self,
        session: &mut Session,
        text: impl Into<String>,
    ) -> rusgo_core::Result<(), ConversationError> {
        session.rewrite_last_user(text);
        self.save(session).await
    }

    /// Removes the latest user entry and writes the session back.
    ///
    /// Used when a message cannot be answered, so the transcript keeps no
    /// question without its reply.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn discard_last_user_message(
        &self,
        session: &mut Session,
    ) -> rusgo_core::Result<(), ConversationError> {
        if session.remove_last_user().is_some() {
            debug!(session_id = %session.id, "discarded unanswered user message");
        }
        self.save(session).await
    }

    async fn save(&self, session: &mut Session) -> rusgo_core::Result<(), ConversationError> {
        let evicted = session.trim_history(self.policy.max_history);
        if evicted > 0 {
            debug!(session_id = %session.id, evicted, "trimmed transcript");
        }

        let user_id = session.user_id;
        self.store
            .put(session.clone())
            .await
            .context(ConversationError::TranscriptUpdate { user_id })
    }
}
