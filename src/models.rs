//! Domain types for the question answering pipeline

use serde::Deserialize;
use serde::Serialize;

/// Relevance grade attached to a (topic, passage) groundtruth link
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    /// Grade 1: partially supporting passage
    Partial,
    /// Grade 2: directly supporting passage
    Direct,
}

impl Grade {
    /// Parse a relevance judgment value from the groundtruth table
    pub fn from_judgment(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::Partial),
            2 => Some(Self::Direct),
            _ => None,
        }
    }

    /// The numeric judgment value as stored in the groundtruth table
    #[must_use]
    pub const fn judgment(self) -> i64 {
        match self {
            Self::Partial => 1,
            Self::Direct => 2,
        }
    }
}

/// A canonical question with its paraphrase variants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub canonical_question: String,
    /// Ordered paraphrase variants, canonical form included
    pub variants: Vec<String>,
}

/// A passage of the source text, owned by exactly one topic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passage {
    pub id: String,
    pub topic_id: String,
    pub text: String,
}

/// The authoritative (topic, passage, grade) relation driving classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundtruthLink {
    pub topic_id: String,
    pub passage_id: String,
    pub grade: Grade,
}

/// Question type derived from a topic's groundtruth grades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionType {
    Known,
    Inferred,
    #[serde(rename = "Out-of-KB")]
    OutOfKb,
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known => write!(f, "Known"),
            Self::Inferred => write!(f, "Inferred"),
            Self::OutOfKb => write!(f, "Out-of-KB"),
        }
    }
}

/// A runner-up topic candidate with its best variant score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedTopic {
    pub topic_id: String,
    pub score: f32,
}

/// Result of matching free-text input against the variant index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub question: String,
    /// Best-matching topic; None only when the similarity floor rejects the
    /// best candidate (or the index is empty)
    pub topic_id: Option<String>,
    /// Cosine similarity of the best variant, clamped to [0, 1]
    pub score: f32,
    /// Rank-ordered runner-up topics for Inferred synthesis
    pub runners_up: Vec<RankedTopic>,
}

/// Result of classifying a matched topic by its groundtruth grades
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub question_type: QuestionType,
    pub topic_id: Option<String>,
    /// Grade-2 passage ids for Known, grade-1 for Inferred, empty for Out-of-KB
    pub supporting_passage_ids: Vec<String>,
    pub runners_up: Vec<RankedTopic>,
}

/// Final answer produced by the synthesizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResult {
    pub answer: String,
    pub classification: ClassificationResult,
    /// Passages actually used to produce the answer, in order; empty for
    /// pure refusal answers
    pub source_passage_ids: Vec<String>,
}

impl AnswerResult {
    #[must_use]
    pub const fn question_type(&self) -> QuestionType {
        self.classification.question_type
    }
}
