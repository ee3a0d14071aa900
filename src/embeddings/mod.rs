//! Embeddings generation module
//!
//! Provides the [`Embedder`] trait used by the question matcher and an HTTP
//! client implementation for Ollama and OpenAI-compatible backends. The
//! matcher builds its index once at startup through this seam; tests supply
//! deterministic in-process embedders instead of a network backend.

pub mod client;

pub use client::EmbeddingClient;
pub use client::EmbeddingProvider;

use async_trait::async_trait;

use crate::errors::Result;

/// Default embedding dimension for all-MiniLM class models
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Maximum batch size for embedding generation
pub const MAX_BATCH_SIZE: usize = 100;

/// Backend-agnostic embedding interface
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts, preserving input order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Fixed output dimension of this backend
    fn dimension(&self) -> usize;
}

/// Configuration for the embedding backend
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub dimension: usize,
    pub endpoint: String,
    pub api_key: Option<String>,
}

impl EmbeddingConfig {
    pub fn from_app_config(config: &crate::config::AppConfig) -> Self {
        // OpenAI-style endpoints carry an API key; everything else is
        // treated as an Ollama-compatible local server
        let provider = if config.embeddings.endpoint.contains("api.openai.com")
            || config.embeddings.api_key.is_some()
        {
            EmbeddingProvider::OpenAI
        } else {
            EmbeddingProvider::Ollama
        };

        Self {
            provider,
            model: config.embeddings.model.clone(),
            dimension: config.embeddings.dimension,
            endpoint: config.embeddings.endpoint.clone(),
            api_key: config.embeddings.api_key.clone(),
        }
    }
}
