//! Inbound message routing.

use crate::texts::{FIND_NEARBY_BUTTON, language_for_label};
use rusgo_core::Language;

/// Phrases that turn a general message into a food search.
pub const FOOD_KEYWORDS: &[&str] = &["хочу кафе", "где поесть", "где кафе", "кафе рядом"];

/// Query sent instead of the user's text when a food phrase matches.
pub const FOOD_QUERY: &str = "кафе Пушкино";

const START_COMMAND: &str = "start";
const SEARCH_COMMAND: &str = "найти";

/// Where an inbound text message goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/start`: greet and offer languages.
    Start,
    /// A language button was pressed.
    SelectLanguage(Language),
    /// The "find nearby" button was pressed.
    FindHint,
    /// `/найти`, with its argument if one was given.
    Search(Option<String>),
    /// Anything else goes to the assistant.
    General,
}

impl Route {
    /// Short name used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::SelectLanguage(_) => "select_language",
            Self::FindHint => "find_hint",
            Self::Search(_) => "search",
            Self::General => "general",
        }
    }
}

/// Picks the handler for a message text.
#[must_use]
pub fn route(text: &str) -> Route {
    if let Some((command, args)) = parse_command(text) {
        match command {
            START_COMMAND => return Route::Start,
            SEARCH_COMMAND => {
                let args = args.trim();
                return Route::Search((!args.is_empty()).then(|| args.to_string()));
            }
            _ => {}
        }
    }

    if let Some(language) = language_for_label(text) {
        return Route::SelectLanguage(language);
    }

    if text == FIND_NEARBY_BUTTON {
        return Route::FindHint;
    }

    Route::General
}

/// Returns true if the text asks for somewhere to eat.
#[must_use]
pub fn is_food_request(text: &str) -> bool {
    let lowered = text.to_lowercase();
    FOOD_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}

/// Splits `/command@bot args` into the bare command and its arguments.
fn parse_command(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix('/')?;
    let (head, args) = match rest.find(char::is_whitespace) {
        Some(index) => rest.split_at(index),
        None => (rest, ""),
    };
    let command = head.split_once('@').map_or(head, |(command, _bot)| command);
    Some((command, args))
}
