//! In-memory dataset of topics, passages, and groundtruth links
//!
//! The dataset is constructed once from already-parsed records, validated up
//! front, and never mutated afterward. All classification truth lives in the
//! groundtruth links; similarity scores play no part here.

pub mod loader;

use std::collections::BTreeSet;
use std::collections::HashMap;

use crate::errors::BardragError;
use crate::errors::Result;
use crate::models::Grade;
use crate::models::GroundtruthLink;
use crate::models::Passage;
use crate::models::Topic;

/// Immutable holder for all canonical questions, variants, passages, and
/// grade links, indexed by identifier
#[derive(Debug)]
pub struct Dataset {
    topics: Vec<Topic>,
    topic_index: HashMap<String, usize>,
    passages: Vec<Passage>,
    passage_index: HashMap<String, usize>,
    links: Vec<GroundtruthLink>,
    links_by_topic: HashMap<String, Vec<usize>>,
}

impl Dataset {
    /// Build a dataset from validated records.
    ///
    /// Fails with `DatasetLoad` if any groundtruth link references a
    /// non-existent topic or passage, if a passage belongs to an unknown
    /// topic, if any identifier is duplicated, or if a topic has zero
    /// variants. Fails with `EmptyDataset` if no topics are given.
    pub fn new(
        topics: Vec<Topic>,
        passages: Vec<Passage>,
        links: Vec<GroundtruthLink>,
    ) -> Result<Self> {
        if topics.is_empty() {
            return Err(BardragError::EmptyDataset);
        }

        let mut topic_index = HashMap::with_capacity(topics.len());
        for (idx, topic) in topics.iter().enumerate() {
            if topic.variants.is_empty() {
                return Err(BardragError::DatasetLoad(format!(
                    "topic {} has zero question variants",
                    topic.id
                )));
            }
            if topic_index.insert(topic.id.clone(), idx).is_some() {
                return Err(BardragError::DatasetLoad(format!(
                    "duplicate topic id {}",
                    topic.id
                )));
            }
        }

        let mut passage_index = HashMap::with_capacity(passages.len());
        for (idx, passage) in passages.iter().enumerate() {
            if !topic_index.contains_key(&passage.topic_id) {
                return Err(BardragError::DatasetLoad(format!(
                    "passage {} belongs to unknown topic {}",
                    passage.id, passage.topic_id
                )));
            }
            if passage_index.insert(passage.id.clone(), idx).is_some() {
                return Err(BardragError::DatasetLoad(format!(
                    "duplicate passage id {}",
                    passage.id
                )));
            }
        }

        let mut links_by_topic: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, link) in links.iter().enumerate() {
            if !topic_index.contains_key(&link.topic_id) {
                return Err(BardragError::DatasetLoad(format!(
                    "groundtruth link references unknown topic {}",
                    link.topic_id
                )));
            }
            if !passage_index.contains_key(&link.passage_id) {
                return Err(BardragError::DatasetLoad(format!(
                    "groundtruth link references unknown passage {}",
                    link.passage_id
                )));
            }
            links_by_topic
                .entry(link.topic_id.clone())
                .or_default()
                .push(idx);
        }

        Ok(Self {
            topics,
            topic_index,
            passages,
            passage_index,
            links,
            links_by_topic,
        })
    }

    /// Every (topic, variant text) pair in topic insertion order, for
    /// building the matcher index
    pub fn list_variants(&self) -> Vec<(&Topic, &str)> {
        self.topics
            .iter()
            .flat_map(|topic| topic.variants.iter().map(move |v| (topic, v.as_str())))
            .collect()
    }

    /// Linked passages of a topic with their grades, in dataset order
    pub fn passages_for(&self, topic_id: &str) -> Vec<(&Passage, Grade)> {
        let Some(link_ids) = self.links_by_topic.get(topic_id) else {
            return Vec::new();
        };
        link_ids
            .iter()
            .map(|&idx| {
                let link = &self.links[idx];
                let passage = &self.passages[self.passage_index[&link.passage_id]];
                (passage, link.grade)
            })
            .collect()
    }

    /// Set of grades present on a topic's links
    pub fn grades_for(&self, topic_id: &str) -> BTreeSet<Grade> {
        self.links_by_topic
            .get(topic_id)
            .map(|link_ids| link_ids.iter().map(|&idx| self.links[idx].grade).collect())
            .unwrap_or_default()
    }

    pub fn topic(&self, topic_id: &str) -> Option<&Topic> {
        self.topic_index.get(topic_id).map(|&idx| &self.topics[idx])
    }

    pub fn passage(&self, passage_id: &str) -> Option<&Passage> {
        self.passage_index
            .get(passage_id)
            .map(|&idx| &self.passages[idx])
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    #[must_use]
    pub fn passage_count(&self) -> usize {
        self.passages.len()
    }
}
