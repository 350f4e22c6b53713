//! Languages the bot can talk in.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A reply language a user can pick.
///
/// Russian is the primary language: the completion service is always
/// spoken to in Russian, and users without a stored preference get Russian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Russian (`ru`), the primary language.
    #[default]
    Russian,
    /// Uzbek (`uz`).
    Uzbek,
    /// Tajik (`tg`).
    Tajik,
}

impl Language {
    /// The primary language.
    pub const PRIMARY: Self = Self::Russian;

    /// Every supported language, in display order.
    pub const ALL: [Self; 3] = [Self::Russian, Self::Uzbek, Self::Tajik];

    /// Returns the ISO 639-1 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Russian => "ru",
            Self::Uzbek => "uz",
            Self::Tajik => "tg",
        }
    }

    /// Returns true for the primary language.
    #[must_use]
    pub fn is_primary(self) -> bool {
        self == Self::PRIMARY
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
