//! Optional text-generation collaborator
//!
//! Generation is advisory: the synthesizer invokes it for Inferred and
//! Out-of-KB answers when enabled, bounds it with a timeout, and falls back
//! to template assembly on any failure. Classification never depends on it.

pub mod client;
pub mod prompts;

pub use client::LlmClient;
pub use client::LlmProvider;

use async_trait::async_trait;

use crate::errors::Result;

/// Which answer strategy is asking for generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// Synthesize a paragraph from partially supporting passages
    Inferred,
    /// Answer from general knowledge; no passages available
    OutOfKb,
}

/// Backend-agnostic generation interface
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate an answer for the question, given the gathered passages
    /// (empty for `OutOfKb`)
    async fn generate(
        &self,
        question: &str,
        passages: &[String],
        mode: GenerationMode,
    ) -> Result<String>;
}
