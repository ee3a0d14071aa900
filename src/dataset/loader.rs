//! CSV loader for the topics and groundtruth tables
//!
//! `topics.csv` carries one row per question variant:
//! `topic_id,question_id,topic,question`. `groundtruth.csv` carries one row
//! per linked passage: `topic_id,topic,passage_id,passage,relevance_judgment`.
//! Topics absent from the groundtruth table are out-of-knowledge-base.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use super::Dataset;
use crate::errors::BardragError;
use crate::errors::Result;
use crate::models::Grade;
use crate::models::GroundtruthLink;
use crate::models::Passage;
use crate::models::Topic;

#[derive(Debug, Deserialize)]
struct TopicRow {
    topic_id: String,
    #[allow(dead_code)]
    question_id: String,
    topic: String,
    question: String,
}

#[derive(Debug, Deserialize)]
struct GroundtruthRow {
    topic_id: String,
    #[allow(dead_code)]
    topic: String,
    passage_id: String,
    passage: String,
    relevance_judgment: i64,
}

/// Load and validate a dataset from the two CSV tables
pub fn load_dataset<P: AsRef<Path>>(topics_path: P, groundtruth_path: P) -> Result<Dataset> {
    let topics = load_topics(topics_path.as_ref())?;
    let (passages, links) = load_groundtruth(groundtruth_path.as_ref())?;

    let dataset = Dataset::new(topics, passages, links)?;
    info!(
        "Loaded dataset: {} topics, {} passages",
        dataset.topic_count(),
        dataset.passage_count()
    );
    Ok(dataset)
}

fn load_topics(path: &Path) -> Result<Vec<Topic>> {
    let mut reader = csv::Reader::from_path(path)?;

    // First occurrence order of a topic_id defines topic insertion order
    let mut topics: Vec<Topic> = Vec::new();
    for row in reader.deserialize() {
        let row: TopicRow = row?;
        match topics.iter_mut().find(|t| t.id == row.topic_id) {
            Some(topic) => {
                if topic.canonical_question != row.topic {
                    return Err(BardragError::DatasetLoad(format!(
                        "topic {} has conflicting canonical questions",
                        row.topic_id
                    )));
                }
                topic.variants.push(row.question);
            }
            None => {
                // The canonical form is itself an index entry; rows that
                // repeat it are not duplicated
                let mut variants = Vec::new();
                if row.question != row.topic {
                    variants.push(row.topic.clone());
                }
                variants.push(row.question);
                topics.push(Topic {
                    id: row.topic_id,
                    canonical_question: row.topic,
                    variants,
                });
            }
        }
    }

    Ok(topics)
}

fn load_groundtruth(path: &Path) -> Result<(Vec<Passage>, Vec<GroundtruthLink>)> {
    let mut reader = csv::Reader::from_path(path)?;

    let mut passages = Vec::new();
    let mut links = Vec::new();
    for row in reader.deserialize() {
        let row: GroundtruthRow = row?;
        let grade = Grade::from_judgment(row.relevance_judgment).ok_or_else(|| {
            BardragError::DatasetLoad(format!(
                "passage {} has invalid relevance judgment {}",
                row.passage_id, row.relevance_judgment
            ))
        })?;
        passages.push(Passage {
            id: row.passage_id.clone(),
            topic_id: row.topic_id.clone(),
            text: row.passage,
        });
        links.push(GroundtruthLink {
            topic_id: row.topic_id,
            passage_id: row.passage_id,
            grade,
        });
    }

    Ok((passages, links))
}
