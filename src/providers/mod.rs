//! Upstream rewriting providers.

pub mod mistral;

use async_trait::async_trait;

use crate::error::Result;

pub use mistral::MistralProvider;

/// A single-turn text completion backend.
///
/// Implementations return the raw completion text; callers sanitize it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Rewriter: Send + Sync {
    /// Send `prompt` as one user message and return the completion.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
