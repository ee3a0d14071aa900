//! Answer assembly, dispatched by question type
//!
//! Known answers come back verbatim from the directly supporting passages.
//! Inferred answers integrate the partially supporting passages, through the
//! generation collaborator when one is configured. Out-of-KB questions get a
//! fixed refusal, or a tagged general-knowledge answer when generation is
//! enabled. Generation failures always degrade to the template path; they
//! never fail the pipeline and never change the classification.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use tracing::warn;

use crate::dataset::Dataset;
use crate::llm::GenerationMode;
use crate::llm::Generator;
use crate::models::AnswerResult;
use crate::models::ClassificationResult;
use crate::models::Grade;
use crate::models::QuestionType;

/// Fixed refusal for out-of-knowledge-base questions
pub const OUT_OF_KB_REFUSAL: &str =
    "I cannot answer this question as it is outside the scope of the Romeo and Juliet knowledge base.";

/// Prefix marking generated answers that fall outside the knowledge base
pub const OUT_OF_KB_TAG: &str = "Outside the knowledge base:";

/// Length cap for template-integrated answers
const TEMPLATE_ANSWER_MAX_CHARS: usize = 500;

/// Synthesizer tuning knobs
#[derive(Debug, Clone)]
pub struct SynthesizerOptions {
    pub generation_timeout: Duration,
    pub include_runner_ups: bool,
}

impl Default for SynthesizerOptions {
    fn default() -> Self {
        Self {
            generation_timeout: Duration::from_secs(30),
            include_runner_ups: false,
        }
    }
}

/// Produces the user-facing answer for a classified question
pub struct AnswerSynthesizer {
    generator: Option<Arc<dyn Generator>>,
    options: SynthesizerOptions,
}

impl AnswerSynthesizer {
    pub fn new(generator: Option<Arc<dyn Generator>>, options: SynthesizerOptions) -> Self {
        Self { generator, options }
    }

    /// Assemble the final answer for a classification result
    pub async fn synthesize(
        &self,
        dataset: &Dataset,
        question: &str,
        classification: ClassificationResult,
    ) -> AnswerResult {
        match classification.question_type {
            QuestionType::Known => self.answer_known(dataset, classification),
            QuestionType::Inferred => self.answer_inferred(dataset, question, classification).await,
            QuestionType::OutOfKb => self.answer_out_of_kb(question, classification).await,
        }
    }

    /// Known: the directly supporting passages verbatim, in dataset order
    fn answer_known(
        &self,
        dataset: &Dataset,
        classification: ClassificationResult,
    ) -> AnswerResult {
        let texts = passage_texts(dataset, &classification.supporting_passage_ids);
        if texts.is_empty() {
            return AnswerResult {
                answer: "No answer found in knowledge base.".to_string(),
                classification,
                source_passage_ids: Vec::new(),
            };
        }

        debug!("Known answer from {} passage(s)", texts.len());
        let source_passage_ids = classification.supporting_passage_ids.clone();
        AnswerResult {
            answer: texts.join(" "),
            classification,
            source_passage_ids,
        }
    }

    /// Inferred: integrate the partially supporting passages, generated when
    /// possible, concatenated otherwise
    async fn answer_inferred(
        &self,
        dataset: &Dataset,
        question: &str,
        classification: ClassificationResult,
    ) -> AnswerResult {
        let mut passage_ids = classification.supporting_passage_ids.clone();
        if self.options.include_runner_ups {
            for runner_up in &classification.runners_up {
                for (passage, grade) in dataset.passages_for(&runner_up.topic_id) {
                    if grade == Grade::Partial && !passage_ids.contains(&passage.id) {
                        passage_ids.push(passage.id.clone());
                    }
                }
            }
        }

        let texts = passage_texts(dataset, &passage_ids);
        if texts.is_empty() {
            return AnswerResult {
                answer: "No relevant information found in knowledge base.".to_string(),
                classification,
                source_passage_ids: Vec::new(),
            };
        }

        let answer = match self
            .try_generate(question, &texts, GenerationMode::Inferred)
            .await
        {
            Some(generated) => generated,
            None => template_integrate(&texts),
        };

        AnswerResult {
            answer,
            classification,
            source_passage_ids: passage_ids,
        }
    }

    /// Out-of-KB: refuse, or tag a general-knowledge answer when enabled
    async fn answer_out_of_kb(
        &self,
        question: &str,
        classification: ClassificationResult,
    ) -> AnswerResult {
        let answer = match self
            .try_generate(question, &[], GenerationMode::OutOfKb)
            .await
        {
            Some(generated) => format!("{OUT_OF_KB_TAG} {generated}"),
            None => OUT_OF_KB_REFUSAL.to_string(),
        };

        AnswerResult {
            answer,
            classification,
            source_passage_ids: Vec::new(),
        }
    }

    /// Run the generation collaborator with a timeout; any failure returns
    /// None and the caller falls back to the template path
    async fn try_generate(
        &self,
        question: &str,
        passages: &[String],
        mode: GenerationMode,
    ) -> Option<String> {
        let generator = self.generator.as_ref()?;

        let generation = generator.generate(question, passages, mode);
        match tokio::time::timeout(self.options.generation_timeout, generation).await {
            Ok(Ok(answer)) if !answer.trim().is_empty() => Some(answer),
            Ok(Ok(_)) => {
                warn!("Generator returned an empty answer, falling back to template");
                None
            }
            Ok(Err(e)) => {
                warn!("Generation failed, falling back to template: {}", e);
                None
            }
            Err(_) => {
                warn!(
                    "Generation timed out after {:?}, falling back to template",
                    self.options.generation_timeout
                );
                None
            }
        }
    }
}

fn passage_texts(dataset: &Dataset, passage_ids: &[String]) -> Vec<String> {
    passage_ids
        .iter()
        .filter_map(|id| dataset.passage(id).map(|p| p.text.clone()))
        .collect()
}

/// Concatenate passages with a length cap, the no-LLM integration strategy
fn template_integrate(texts: &[String]) -> String {
    let integrated = texts.join(" ");
    if integrated.chars().count() <= TEMPLATE_ANSWER_MAX_CHARS {
        integrated
    } else {
        let truncated: String = integrated
            .chars()
            .take(TEMPLATE_ANSWER_MAX_CHARS - 3)
            .collect();
        format!("{truncated}...")
    }
}
