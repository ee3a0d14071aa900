//! Nearest-question matching over the variant embedding index

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;
use tracing::info;

use crate::dataset::Dataset;
use crate::embeddings::Embedder;
use crate::errors::Result;
use crate::models::MatchResult;
use crate::models::RankedTopic;

/// Matcher tuning knobs, taken from `MatcherConfig`
#[derive(Debug, Clone)]
pub struct MatcherOptions {
    pub runner_up_count: usize,
    pub similarity_floor: Option<f32>,
}

impl Default for MatcherOptions {
    fn default() -> Self {
        Self {
            runner_up_count: 3,
            similarity_floor: None,
        }
    }
}

/// One indexed question variant with its normalized embedding
struct IndexedVariant {
    topic_order: usize,
    topic_id: String,
    embedding: Vec<f32>,
}

/// Finds the best-matching topic for free-text input by cosine similarity
/// against every paraphrase variant of every topic.
///
/// The index is built once at construction and read-only afterward, so
/// concurrent queries need no locking.
pub struct QuestionMatcher {
    embedder: Arc<dyn Embedder>,
    variants: Vec<IndexedVariant>,
    options: MatcherOptions,
}

impl QuestionMatcher {
    /// Embed every question variant and build the index.
    ///
    /// An unavailable embedding backend fails here, at startup; per-query
    /// failures only surface for the query that hit them.
    pub async fn build(
        dataset: &Dataset,
        embedder: Arc<dyn Embedder>,
        options: MatcherOptions,
    ) -> Result<Self> {
        let pairs = dataset.list_variants();
        let texts: Vec<String> = pairs.iter().map(|(_, text)| (*text).to_string()).collect();

        info!("Building question index for {} variants", texts.len());
        let embeddings = embedder.embed_batch(&texts).await?;

        let topic_order: HashMap<&str, usize> = dataset
            .topics()
            .iter()
            .enumerate()
            .map(|(idx, topic)| (topic.id.as_str(), idx))
            .collect();

        let variants = pairs
            .iter()
            .zip(embeddings)
            .map(|((topic, _), mut embedding)| {
                normalize(&mut embedding);
                IndexedVariant {
                    topic_order: topic_order[topic.id.as_str()],
                    topic_id: topic.id.clone(),
                    embedding,
                }
            })
            .collect();

        Ok(Self {
            embedder,
            variants,
            options,
        })
    }

    /// Match a question against the index.
    ///
    /// Always returns a topic when the index is non-empty, unless a
    /// configured similarity floor rejects the best candidate; deciding
    /// whether a low-confidence match is out of the knowledge base is the
    /// classifier's job, not the matcher's.
    pub async fn match_question(&self, question: &str) -> Result<MatchResult> {
        let mut query = self.embedder.embed(question).await?;
        normalize(&mut query);

        // Best score per topic, keyed by insertion order for stable ties
        let mut best_per_topic: HashMap<&str, (usize, f32)> = HashMap::new();
        for variant in &self.variants {
            let score = dot(&query, &variant.embedding);
            let entry = best_per_topic
                .entry(variant.topic_id.as_str())
                .or_insert((variant.topic_order, f32::MIN));
            if score > entry.1 {
                entry.1 = score;
            }
        }

        let mut ranked: Vec<(&str, usize, f32)> = best_per_topic
            .into_iter()
            .map(|(id, (order, score))| (id, order, score))
            .collect();
        // Descending score; ties go to the earlier-inserted topic
        ranked.sort_by(|a, b| b.2.total_cmp(&a.2).then(a.1.cmp(&b.1)));

        let Some(&(best_id, _, best_score)) = ranked.first() else {
            return Ok(MatchResult {
                question: question.to_string(),
                topic_id: None,
                score: 0.0,
                runners_up: Vec::new(),
            });
        };

        let score = best_score.clamp(0.0, 1.0);
        let below_floor = self
            .options
            .similarity_floor
            .is_some_and(|floor| score < floor);

        let runners_up = ranked
            .iter()
            .skip(1)
            .take(self.options.runner_up_count)
            .map(|&(id, _, s)| RankedTopic {
                topic_id: id.to_string(),
                score: s.clamp(0.0, 1.0),
            })
            .collect();

        debug!(
            "Matched topic: {} (score {:.4}, floor rejected: {})",
            best_id, score, below_floor
        );

        Ok(MatchResult {
            question: question.to_string(),
            topic_id: (!below_floor).then(|| best_id.to_string()),
            score,
            runners_up,
        })
    }

    /// Number of indexed variants
    #[must_use]
    pub fn index_len(&self) -> usize {
        self.variants.len()
    }
}

fn normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::models::Grade;
    use crate::models::GroundtruthLink;
    use crate::models::Passage;
    use crate::models::Topic;

    /// Deterministic embedder: hashes words into a fixed number of buckets,
    /// so word overlap drives cosine similarity
    struct BagOfWordsEmbedder;

    fn word_vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; 64];
        for word in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hash: u64 = 5381;
            for byte in word.bytes() {
                hash = hash.wrapping_mul(33).wrapping_add(u64::from(byte));
            }
            v[(hash % 64) as usize] += 1.0;
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
            64
        }
    }

    /// Maps every text to the same vector, forcing ties
    struct ConstantEmbedder;

    #[async_trait]
    impl Embedder for ConstantEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    fn sample_dataset() -> Dataset {
        let topics = vec![
            Topic {
                id: "W01".to_string(),
                canonical_question: "What metaphor does Romeo use to describe Juliet?".to_string(),
                variants: vec![
                    "What metaphor does Romeo use to describe Juliet?".to_string(),
                    "How does Romeo describe Juliet at the window?".to_string(),
                ],
            },
            Topic {
                id: "W02".to_string(),
                canonical_question: "How does Tybalt's attitude toward Romeo evolve?".to_string(),
                variants: vec!["How does Tybalt's attitude toward Romeo evolve?".to_string()],
            },
            Topic {
                id: "W50".to_string(),
                canonical_question: "What would happen if Romeo had a smartphone?".to_string(),
                variants: vec!["What would happen if Romeo had a smartphone?".to_string()],
            },
        ];
        let passages = vec![Passage {
            id: "P001".to_string(),
            topic_id: "W01".to_string(),
            text: "Juliet is the sun".to_string(),
        }];
        let links = vec![GroundtruthLink {
            topic_id: "W01".to_string(),
            passage_id: "P001".to_string(),
            grade: Grade::Direct,
        }];
        Dataset::new(topics, passages, links).unwrap()
    }

    #[tokio::test]
    async fn test_matches_paraphrase_variant_to_owning_topic() {
        let dataset = sample_dataset();
        let matcher = QuestionMatcher::build(
            &dataset,
            Arc::new(BagOfWordsEmbedder),
            MatcherOptions::default(),
        )
        .await
        .unwrap();

        let result = matcher
            .match_question("How does Romeo describe Juliet at the window?")
            .await
            .unwrap();
        assert_eq!(result.topic_id.as_deref(), Some("W01"));
        assert!((result.score - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_match_is_deterministic() {
        let dataset = sample_dataset();
        let matcher = QuestionMatcher::build(
            &dataset,
            Arc::new(BagOfWordsEmbedder),
            MatcherOptions::default(),
        )
        .await
        .unwrap();

        let first = matcher
            .match_question("What metaphor does Romeo use?")
            .await
            .unwrap();
        let second = matcher
            .match_question("What metaphor does Romeo use?")
            .await
            .unwrap();
        assert_eq!(first.topic_id, second.topic_id);
        assert!((first.score - second.score).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_ties_break_by_insertion_order() {
        let dataset = sample_dataset();
        let matcher = QuestionMatcher::build(
            &dataset,
            Arc::new(ConstantEmbedder),
            MatcherOptions::default(),
        )
        .await
        .unwrap();

        let result = matcher.match_question("anything at all").await.unwrap();
        assert_eq!(result.topic_id.as_deref(), Some("W01"));
    }

    #[tokio::test]
    async fn test_runner_ups_are_distinct_topics() {
        let dataset = sample_dataset();
        let matcher = QuestionMatcher::build(
            &dataset,
            Arc::new(BagOfWordsEmbedder),
            MatcherOptions::default(),
        )
        .await
        .unwrap();

        let result = matcher
            .match_question("What metaphor does Romeo use to describe Juliet?")
            .await
            .unwrap();
        assert_eq!(result.topic_id.as_deref(), Some("W01"));
        assert_eq!(result.runners_up.len(), 2);
        assert!(result.runners_up.iter().all(|r| r.topic_id != "W01"));
        // Rank order is by descending score
        assert!(result.runners_up[0].score >= result.runners_up[1].score);
    }

    #[tokio::test]
    async fn test_similarity_floor_rejects_weak_match() {
        let dataset = sample_dataset();
        let matcher = QuestionMatcher::build(
            &dataset,
            Arc::new(BagOfWordsEmbedder),
            MatcherOptions {
                runner_up_count: 3,
                similarity_floor: Some(0.99),
            },
        )
        .await
        .unwrap();

        let result = matcher
            .match_question("completely unrelated gibberish zzz")
            .await
            .unwrap();
        assert!(result.topic_id.is_none());
    }
}
