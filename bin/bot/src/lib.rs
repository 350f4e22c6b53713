//! RUSGO Telegram bot.
//!
//! Wires the conversation, AI, and integration crates to Telegram: routes
//! each inbound message, builds the reply, and sends it back.

pub mod assistant;
pub mod config;
pub mod error;
pub mod reply;
pub mod router;
pub mod telegram;
pub mod texts;

pub use assistant::Assistant;
pub use config::BotConfig;
pub use reply::{Keyboard, Reply};
pub use router::Route;
