//! Conversation sessions.
//!
//! A session is a user's rolling transcript plus the time they last wrote.
//! The transcript always opens with exactly one system entry, inserted when
//! the session is created.

use crate::message::{Message, MessageRole};
use chrono::{DateTime, Duration, Utc};
use rusgo_core::{SessionId, UserId};
use serde::{Deserialize, Serialize};

/// Expiry and retention rules applied to every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Idle time after which the next message starts a fresh session.
    pub ttl: Duration,
    /// Maximum number of non-system entries kept; 0 keeps everything.
    pub max_history: usize,
}

impl SessionPolicy {
    /// Default idle timeout, in minutes.
    pub const DEFAULT_TTL_MINUTES: i64 = 30;

    /// Default number of retained non-system entries.
    pub const DEFAULT_MAX_HISTORY: usize = 40;

    /// Creates a policy.
    #[must_use]
    pub fn new(ttl: Duration, max_history: usize) -> Self {
        Self { ttl, max_history }
    }
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self::new(
            Duration::minutes(Self::DEFAULT_TTL_MINUTES),
            Self::DEFAULT_MAX_HISTORY,
        )
    }
}

/// A conversation session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier.
    pub id: SessionId,
    /// The user who owns this session.
    pub user_id: UserId,
    /// Transcript, oldest first.
    pub messages: Vec<Message>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the user last wrote into this session.
    pub last_active_at: DateTime<Utc>,
}

impl Session {
    /// Creates a session holding only the system instruction.
    #[must_use]
    pub fn new(user_id: UserId, system_prompt: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: SessionId::new(),
            user_id,
            messages: vec![Message::at(MessageRole::System, system_prompt, now)],
            created_at: now,
            last_active_at: now,
        }
    }

    /// Returns true once the idle time strictly exceeds `ttl`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.last_active_at > ttl
    }

    /// Appends a user entry and marks the session active at `now`.
    pub fn push_user(&mut self, content: impl Into<String>, now: DateTime<Utc>) {
        self.messages.push(Message::at(MessageRole::User, content, now));
        self.last_active_at = now;
    }

    /// Appends an assistant entry. Activity time is left alone.
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    /// Replaces the content of the most recent user entry.
    ///
    /// Returns false if the transcript has no user entry.
    pub fn rewrite_last_user(&mut self, content: impl Into<String>) -> bool {
        match self
            .messages
            .iter_mut()
            .rev()
            .find(|m| m.role == MessageRole::User)
        {
            Some(message) => {
                message.content = content.into();
                true
            }
            None => false,
        }
    }

    /// Removes the most recent user entry and returns it.
    pub fn remove_last_user(&mut self) -> Option<Message> {
        let index = self
            .messages
            .iter()
            .rposition(|m| m.role == MessageRole::User)?;
        Some(self.messages.remove(index))
    }

    /// Drops the oldest entries until at most `max_history` non-system
    /// entries remain.
    ///
    /// Eviction continues up to the next user entry, so an assistant entry
    /// never outlives the question it answered and the retained history
    /// always opens with a user entry. Returns the number of evicted
    /// entries.
    pub fn trim_history(&mut self, max_history: usize) -> usize {
        if max_history == 0 {
            return 0;
        }

        let start = self
            .messages
            .iter()
            .take_while(|m| m.role == MessageRole::System)
            .count();
        let history = self.messages.len() - start;
        if history <= max_history {
            return 0;
        }

        let mut cut = history - max_history;
        while self
            .messages
            .get(start + cut)
            .is_some_and(|m| m.role != MessageRole::User)
        {
            cut += 1;
        }

        self.messages.drain(start..start + cut);
        cut
    }

    /// Returns the transcript in order.
    #[must_use]
    pub fn transcript(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the number of messages.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}
