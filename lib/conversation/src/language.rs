//! Per-user reply language preferences.

use async_trait::async_trait;
use rusgo_core::{Language, UserId};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Trait for language preference storage.
#[async_trait]
pub trait LanguageStore: Send + Sync {
    /// Returns the stored preference, or the primary language.
    async fn get(&self, user_id: UserId) -> Language;

    /// Overwrites the preference of a user.
    async fn set(&self, user_id: UserId, language: Language);
}

/// Process-local preference store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryLanguageStore {
    preferences: RwLock<HashMap<UserId, Language>>,
}

impl InMemoryLanguageStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LanguageStore for InMemoryLanguageStore {
    async fn get(&self, user_id: UserId) -> Language {
        self.preferences
            .read()
            .await
            .get(&user_id)
            .copied()
            .unwrap_or(Language::PRIMARY)
    }

    async fn set(&self, user_id: UserId, language: Language) {
        self.preferences.write().await.insert(user_id, language);
    }
}
