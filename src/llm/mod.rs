//! Upstream AI chat providers.
//!
//! The platform treats generation as an external capability: given a system
//! prompt and a student question, return generated text. Two interchangeable
//! backends implement [`ChatProvider`]; everything else (usage caps, course
//! context, persistence) is provider-agnostic and lives in the chat service.

pub mod gemini;
pub mod openai;

use async_trait::async_trait;

use crate::error::UpstreamError;

/// A chat-completion backend.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// The provider's display name, used in logs.
    fn name(&self) -> &'static str;

    /// Generates a response to `user_prompt` under `system_prompt`.
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, UpstreamError>;
}
