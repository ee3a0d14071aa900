//! LLM API client for Ollama and OpenAI-compatible backends

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::prompts;
use super::GenerationMode;
use super::Generator;
use crate::errors::BardragError;
use crate::errors::Result;

/// Supported generation providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    /// `OpenAI`-compatible chat completions API
    OpenAI,
    /// Ollama local generation
    Ollama,
}

/// Client for the generation collaborator
pub struct LlmClient {
    provider: LlmProvider,
    model: String,
    endpoint: String,
    api_key: String,
    client: Client,
}

impl LlmClient {
    /// Create a new LLM client
    ///
    /// # Errors
    /// - HTTP client build errors (invalid configuration)
    pub fn new(config: &crate::config::LlmConfig) -> Result<Self> {
        // The ask-path timeout lives in the synthesizer; this one only
        // bounds a hung connection
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs.max(1) * 2))
            .build()
            .map_err(|e| BardragError::Http(e.to_string()))?;

        let provider = if config.endpoint.contains("api.openai.com") || !config.api_key.is_empty()
        {
            LlmProvider::OpenAI
        } else {
            LlmProvider::Ollama
        };

        Ok(Self {
            provider,
            model: config.model.clone(),
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    async fn generate_ollama(&self, prompt: &str) -> Result<String> {
        #[derive(Serialize)]
        struct OllamaRequest<'a> {
            model: &'a str,
            prompt: &'a str,
            stream: bool,
        }

        #[derive(Deserialize)]
        struct OllamaResponse {
            response: String,
        }

        let url = format!("{}/api/generate", self.endpoint);
        debug!("Calling Ollama generate API: {}", url);

        let request = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| BardragError::GenerationUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BardragError::GenerationUnavailable(format!(
                "Ollama API error ({status}): {error_text}"
            )));
        }

        let result: OllamaResponse = response.json().await.map_err(|e| {
            BardragError::GenerationUnavailable(format!("Failed to parse response: {e}"))
        })?;

        Ok(result.response.trim().to_string())
    }

    async fn generate_openai(&self, prompt: &str) -> Result<String> {
        #[derive(Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: Vec<ChatMessage<'a>>,
        }

        #[derive(Serialize)]
        struct ChatMessage<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<ChatChoice>,
        }

        #[derive(Deserialize)]
        struct ChatChoice {
            message: ChatChoiceMessage,
        }

        #[derive(Deserialize)]
        struct ChatChoiceMessage {
            content: String,
        }

        let url = format!("{}/chat/completions", self.endpoint);
        debug!("Calling chat completions API: {}", url);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| BardragError::GenerationUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BardragError::GenerationUnavailable(format!(
                "Chat API error ({status}): {error_text}"
            )));
        }

        let result: ChatResponse = response.json().await.map_err(|e| {
            BardragError::GenerationUnavailable(format!("Failed to parse response: {e}"))
        })?;

        result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| {
                BardragError::GenerationUnavailable("No choices in response".to_string())
            })
    }
}

#[async_trait]
impl Generator for LlmClient {
    async fn generate(
        &self,
        question: &str,
        passages: &[String],
        mode: GenerationMode,
    ) -> Result<String> {
        let prompt = match mode {
            GenerationMode::Inferred => prompts::inferred_synthesis(question, passages),
            GenerationMode::OutOfKb => prompts::out_of_kb(question),
        };

        match self.provider {
            LlmProvider::Ollama => self.generate_ollama(&prompt).await,
            LlmProvider::OpenAI => self.generate_openai(&prompt).await,
        }
    }
}
