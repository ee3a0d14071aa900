//! Question answering pipeline: match -> classify -> synthesize
//!
//! A question is embedded and matched to the nearest canonical question
//! variant, the owning topic is classified by its groundtruth grades, and an
//! answer is assembled by the type-specific strategy.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bardrag::config::AppConfig;
//! use bardrag::qa::QaService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = QaService::new(&config).await?;
//!
//!     let result = service.ask("What metaphor does Romeo use to describe Juliet?").await?;
//!     println!("[{}] {}", result.question_type(), result.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod classifier;
pub mod matcher;
pub mod synthesizer;

pub use classifier::classify;
pub use matcher::MatcherOptions;
pub use matcher::QuestionMatcher;
pub use synthesizer::AnswerSynthesizer;
pub use synthesizer::SynthesizerOptions;
pub use synthesizer::OUT_OF_KB_REFUSAL;
pub use synthesizer::OUT_OF_KB_TAG;

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use tracing::info;

use crate::config::AppConfig;
use crate::dataset::loader;
use crate::dataset::Dataset;
use crate::embeddings::Embedder;
use crate::embeddings::EmbeddingClient;
use crate::embeddings::EmbeddingConfig;
use crate::errors::Result;
use crate::llm::Generator;
use crate::llm::LlmClient;
use crate::models::AnswerResult;

/// Complete question answering service over the loaded dataset
pub struct QaService {
    dataset: Arc<Dataset>,
    matcher: QuestionMatcher,
    synthesizer: AnswerSynthesizer,
}

impl QaService {
    /// Create a service from configuration: load the dataset, build the
    /// variant index, and wire the optional generation collaborator.
    ///
    /// # Errors
    /// - Dataset load errors (missing files, inconsistent groundtruth)
    /// - Embedding backend errors while building the index
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let dataset = Arc::new(loader::load_dataset(
            config.topics_path(),
            config.groundtruth_path(),
        )?);

        let embedder: Arc<dyn Embedder> = Arc::new(EmbeddingClient::new(
            &EmbeddingConfig::from_app_config(config),
        )?);

        let generator: Option<Arc<dyn Generator>> = if config.generation_enabled() {
            Some(Arc::new(LlmClient::new(&config.llm)?))
        } else {
            None
        };

        Self::from_parts(
            dataset,
            embedder,
            generator,
            MatcherOptions {
                runner_up_count: config.matcher.runner_up_count,
                similarity_floor: config.matcher.similarity_floor,
            },
            SynthesizerOptions {
                generation_timeout: Duration::from_secs(config.llm.timeout_secs),
                include_runner_ups: config.matcher.include_runner_ups,
            },
        )
        .await
    }

    /// Create a service from existing parts; the seam tests use to supply
    /// deterministic embedding and generation backends
    pub async fn from_parts(
        dataset: Arc<Dataset>,
        embedder: Arc<dyn Embedder>,
        generator: Option<Arc<dyn Generator>>,
        matcher_options: MatcherOptions,
        synthesizer_options: SynthesizerOptions,
    ) -> Result<Self> {
        let matcher = QuestionMatcher::build(&dataset, embedder, matcher_options).await?;
        info!(
            "QA service ready: {} topics, {} indexed variants, generation {}",
            dataset.topic_count(),
            matcher.index_len(),
            if generator.is_some() { "enabled" } else { "disabled" }
        );

        Ok(Self {
            dataset,
            matcher,
            synthesizer: AnswerSynthesizer::new(generator, synthesizer_options),
        })
    }

    /// Answer a question: match, classify, synthesize
    pub async fn ask(&self, question: &str) -> Result<AnswerResult> {
        info!("Processing question: {}", question);

        let match_result = self.matcher.match_question(question).await?;
        debug!(
            "Matched topic {:?} with score {:.4}",
            match_result.topic_id, match_result.score
        );

        let classification = classify(&self.dataset, &match_result);
        debug!("Question type: {}", classification.question_type);

        let answer = self
            .synthesizer
            .synthesize(&self.dataset, question, classification)
            .await;

        info!("Answered as {}", answer.question_type());
        Ok(answer)
    }

    /// The loaded dataset
    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}
