//! Outbound replies and their formatting.

use crate::texts::{TOPIC_ROWS, language_label};
use rand::seq::SliceRandom;
use rusgo_core::Language;
use rusgo_integration::Place;
use std::fmt::Write as _;

/// Closing phrases appended to assistant replies. The empty entry means
/// no phrase.
pub const SUFFIXES: [&str; 4] = [
    "",
    "\n\nЕсли что — напиши, брат, я подскажу ещё.",
    "\n\nЕсли не понял — скажи проще, я объясню по-человечески.",
    "\n\nНадо будет — разберёмся как надо, брат.",
];

/// Reply keyboard, row by row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<String>>,
}

impl Keyboard {
    /// One row with every language button.
    #[must_use]
    pub fn languages() -> Self {
        Self {
            rows: vec![
                Language::ALL
                    .into_iter()
                    .map(|language| language_label(language).to_string())
                    .collect(),
            ],
        }
    }

    /// Topic buttons shown once a language is chosen.
    #[must_use]
    pub fn topics() -> Self {
        Self {
            rows: TOPIC_ROWS
                .iter()
                .map(|row| row.iter().map(|label| (*label).to_string()).collect())
                .collect(),
        }
    }
}

/// A message to send back to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl Reply {
    /// Plain text reply.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    /// Text reply that also replaces the keyboard.
    pub fn with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }
}

/// Chooses the closing phrase for an assistant reply.
pub trait SuffixPicker: Send + Sync {
    fn pick(&self) -> &'static str;
}

/// Picks uniformly from [`SUFFIXES`].
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSuffix;

impl SuffixPicker for RandomSuffix {
    fn pick(&self) -> &'static str {
        SUFFIXES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or_default()
    }
}

/// Renders search results under `header`, one block per place.
#[must_use]
pub fn format_places(header: &str, places: &[Place]) -> String {
    let mut out = header.to_string();
    for place in places {
        let _ = write!(
            out,
            "📍 {}\n📬 {}\n📞 {}\n\n",
            place.name, place.address, place.phone
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texts::{FIND_NEARBY_BUTTON, SEARCH_HEADER};

    #[test]
    fn language_keyboard_is_one_row() {
        let keyboard = Keyboard::languages();
        assert_eq!(
            keyboard.rows,
            vec![vec!["🇷🇺 Русский", "🇺🇿 O'zbekcha", "🇹🇯 Тоҷикӣ"]]
        );
    }

    #[test]
    fn topic_keyboard_has_find_button() {
        let keyboard = Keyboard::topics();
        assert_eq!(keyboard.rows.len(), 5);
        assert_eq!(keyboard.rows[0].len(), 2);
        assert_eq!(keyboard.rows[3], vec![FIND_NEARBY_BUTTON.to_string()]);
    }

    #[test]
    fn random_suffix_comes_from_the_list() {
        let picker = RandomSuffix;
        for _ in 0..32 {
            assert!(SUFFIXES.contains(&picker.pick()));
        }
    }

    #[test]
    fn places_are_rendered_in_blocks() {
        let places = vec![
            Place {
                name: "МФЦ".to_string(),
                address: "ул. Ленина, 1".to_string(),
                phone: "+7 495 000-00-00".to_string(),
            },
            Place {
                name: "Клиника".to_string(),
                address: "Адрес неизвестен".to_string(),
                phone: String::new(),
            },
        ];

        let text = format_places(SEARCH_HEADER, &places);

        assert_eq!(
            text,
            "🔍 Нашёл вот что:\n\n\
             📍 МФЦ\n📬 ул. Ленина, 1\n📞 +7 495 000-00-00\n\n\
             📍 Клиника\n📬 Адрес неизвестен\n📞 \n\n"
        );
    }
}
