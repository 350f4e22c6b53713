//! Chat completion primitives for the rusgo assistant bot.
//!
//! This crate provides the completion client the bot talks to:
//!
//! - **Backend trait**: one transcript in, one generated reply out
//! - **OpenAI backend**: the `chat/completions` HTTP implementation

pub mod backend;
pub mod error;
pub mod openai;

pub use backend::{
    LlmBackend, LlmBackendConfig, LlmMessage, LlmProvider, LlmRequest, LlmResponse, MessageRole,
    TokenUsage,
};
pub use error::LlmError;
pub use openai::OpenAiBackend;
