//! External service clients for the rusgo assistant bot.
//!
//! This crate provides:
//!
//! - **Translator**: text translation between the supported languages
//! - **Places search**: business listings for a free-text query

pub mod error;
pub mod places;
pub mod translate;

pub use error::ConnectorError;
pub use places::{Place, PlacesSearch, YandexPlaces};
pub use translate::{GoogleTranslator, SourceLanguage, Translator};
