//! End-to-end pipeline tests with deterministic in-process backends

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use bardrag::dataset::Dataset;
use bardrag::embeddings::Embedder;
use bardrag::llm::GenerationMode;
use bardrag::llm::Generator;
use bardrag::models::Grade;
use bardrag::models::GroundtruthLink;
use bardrag::models::Passage;
use bardrag::models::QuestionType;
use bardrag::models::Topic;
use bardrag::qa::MatcherOptions;
use bardrag::qa::QaService;
use bardrag::qa::SynthesizerOptions;
use bardrag::qa::OUT_OF_KB_REFUSAL;
use bardrag::qa::OUT_OF_KB_TAG;
use bardrag::Result;

/// Deterministic embedder: hashes words into buckets so that word overlap
/// drives cosine similarity, standing in for a sentence-embedding backend
struct BagOfWordsEmbedder;

fn word_vector(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; 128];
    for word in text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let mut hash: u64 = 5381;
        for byte in word.bytes() {
            hash = hash.wrapping_mul(33).wrapping_add(u64::from(byte));
        }
        v[(hash % 128) as usize] += 1.0;
    }
    v
}

#[async_trait]
impl Embedder for BagOfWordsEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(word_vector(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| word_vector(t)).collect())
    }

    fn dimension(&self) -> usize {
        128
    }
}

struct EchoGenerator;

#[async_trait]
impl Generator for EchoGenerator {
    async fn generate(
        &self,
        question: &str,
        passages: &[String],
        mode: GenerationMode,
    ) -> Result<String> {
        Ok(match mode {
            GenerationMode::Inferred => {
                format!("integrated answer from {} passages", passages.len())
            }
            GenerationMode::OutOfKb => format!("general knowledge answer for: {question}"),
        })
    }
}

fn sample_dataset() -> Dataset {
    let topic = |id: &str, variants: &[&str]| Topic {
        id: id.to_string(),
        canonical_question: variants[0].to_string(),
        variants: variants.iter().map(ToString::to_string).collect(),
    };
    let passage = |id: &str, topic_id: &str, text: &str| Passage {
        id: id.to_string(),
        topic_id: topic_id.to_string(),
        text: text.to_string(),
    };
    let link = |topic_id: &str, passage_id: &str, grade: Grade| GroundtruthLink {
        topic_id: topic_id.to_string(),
        passage_id: passage_id.to_string(),
        grade,
    };

    Dataset::new(
        vec![
            topic(
                "W01",
                &[
                    "What metaphor does Romeo use to describe Juliet?",
                    "How does Romeo describe Juliet when he sees her at the window?",
                ],
            ),
            topic(
                "W12",
                &[
                    "How does Tybalt's language and attitude toward Romeo evolve through different acts?",
                    "How does Tybalt's attitude toward Romeo change over the play?",
                ],
            ),
            topic(
                "W50",
                &[
                    "What would happen if Romeo and Juliet had smartphones?",
                    "What would happen if Romeo had a smartphone?",
                ],
            ),
        ],
        vec![
            passage("P001", "W01", "Juliet is the sun"),
            passage("P045", "W12", "Tybalt vows to strike Romeo dead at the feast"),
            passage("P046", "W12", "Tybalt returns to challenge Romeo to a duel"),
        ],
        vec![
            link("W01", "P001", Grade::Direct),
            link("W12", "P045", Grade::Partial),
            link("W12", "P046", Grade::Partial),
        ],
    )
    .unwrap()
}

async fn service(generator: Option<Arc<dyn Generator>>) -> QaService {
    QaService::from_parts(
        Arc::new(sample_dataset()),
        Arc::new(BagOfWordsEmbedder),
        generator,
        MatcherOptions::default(),
        SynthesizerOptions {
            generation_timeout: Duration::from_secs(1),
            include_runner_ups: false,
        },
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn known_variants_return_grade_two_passages() {
    let qa = service(None).await;

    for variant in [
        "What metaphor does Romeo use to describe Juliet?",
        "How does Romeo describe Juliet when he sees her at the window?",
    ] {
        let result = qa.ask(variant).await.unwrap();
        assert_eq!(result.question_type(), QuestionType::Known, "{variant}");
        assert_eq!(result.source_passage_ids, vec!["P001".to_string()]);
        assert!(result.answer.contains("Juliet is the sun"));
    }
}

#[tokio::test]
async fn inferred_variants_return_grade_one_passages() {
    let qa = service(None).await;

    for variant in [
        "How does Tybalt's language and attitude toward Romeo evolve through different acts?",
        "How does Tybalt's attitude toward Romeo change over the play?",
    ] {
        let result = qa.ask(variant).await.unwrap();
        assert_eq!(result.question_type(), QuestionType::Inferred, "{variant}");
        assert_eq!(
            result.source_passage_ids,
            vec!["P045".to_string(), "P046".to_string()]
        );
    }
}

#[tokio::test]
async fn out_of_kb_refuses_when_generation_disabled() {
    let qa = service(None).await;

    let result = qa
        .ask("What would happen if Romeo had a smartphone?")
        .await
        .unwrap();
    assert_eq!(result.question_type(), QuestionType::OutOfKb);
    assert!(result.source_passage_ids.is_empty());
    assert_eq!(result.answer, OUT_OF_KB_REFUSAL);
}

#[tokio::test]
async fn out_of_kb_generated_answer_is_tagged() {
    let qa = service(Some(Arc::new(EchoGenerator))).await;

    let result = qa
        .ask("What would happen if Romeo had a smartphone?")
        .await
        .unwrap();
    assert_eq!(result.question_type(), QuestionType::OutOfKb);
    assert!(result.source_passage_ids.is_empty());
    assert!(result.answer.starts_with(OUT_OF_KB_TAG));
}

#[tokio::test]
async fn inferred_generation_reports_gathered_passages() {
    let qa = service(Some(Arc::new(EchoGenerator))).await;

    let result = qa
        .ask("How does Tybalt's attitude toward Romeo change over the play?")
        .await
        .unwrap();
    assert_eq!(result.question_type(), QuestionType::Inferred);
    assert_eq!(result.answer, "integrated answer from 2 passages");
    assert_eq!(
        result.source_passage_ids,
        vec!["P045".to_string(), "P046".to_string()]
    );
}

#[tokio::test]
async fn ask_is_idempotent() {
    let qa = service(None).await;
    let question = "What metaphor does Romeo use to describe Juliet?";

    let first = qa.ask(question).await.unwrap();
    let second = qa.ask(question).await.unwrap();
    assert_eq!(first.question_type(), second.question_type());
    assert_eq!(first.source_passage_ids, second.source_passage_ids);
    assert_eq!(first.answer, second.answer);
}

#[tokio::test]
async fn eval_batch_preserves_input_order() {
    let qa = service(None).await;
    let questions = vec![
        "What metaphor does Romeo use to describe Juliet?".to_string(),
        "How does Tybalt's attitude toward Romeo change over the play?".to_string(),
        "What would happen if Romeo had a smartphone?".to_string(),
    ];

    let records = bardrag::eval::run_batch(&qa, &questions).await.unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].question_type, QuestionType::Known);
    assert_eq!(records[0].matched_topic.as_deref(), Some("W01"));
    assert_eq!(records[1].question_type, QuestionType::Inferred);
    assert_eq!(records[2].question_type, QuestionType::OutOfKb);
    assert!(records[2].chosen_passage_ids.is_empty());
    for (record, question) in records.iter().zip(&questions) {
        assert_eq!(&record.question, question);
    }
}
