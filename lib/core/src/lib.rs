//! Core domain types and utilities for the rusgo assistant bot.
//!
//! This crate provides the foundational types, error handling, and shared
//! identifiers used by the conversation, AI, and integration crates.

pub mod error;
pub mod id;
pub mod language;

pub use error::Result;
pub use id::{MessageId, SessionId, UserId};
pub use language::Language;
