//! Question type classification from groundtruth grades
//!
//! Classification is a pure function of the matched topic's groundtruth
//! links: any grade-2 link makes the question Known, otherwise any grade-1
//! link makes it Inferred, otherwise it is out of the knowledge base. No
//! similarity threshold and no free-text heuristics are involved.

use crate::dataset::Dataset;
use crate::models::ClassificationResult;
use crate::models::Grade;
use crate::models::MatchResult;
use crate::models::QuestionType;

/// Classify a match result by the topic's groundtruth grades.
///
/// A match without a topic (empty index, or a best candidate rejected by
/// the similarity floor) classifies as Out-of-KB.
pub fn classify(dataset: &Dataset, match_result: &MatchResult) -> ClassificationResult {
    let Some(topic_id) = match_result.topic_id.as_deref() else {
        return ClassificationResult {
            question_type: QuestionType::OutOfKb,
            topic_id: None,
            supporting_passage_ids: Vec::new(),
            runners_up: match_result.runners_up.clone(),
        };
    };

    let grades = dataset.grades_for(topic_id);
    let question_type = if grades.contains(&Grade::Direct) {
        QuestionType::Known
    } else if grades.contains(&Grade::Partial) {
        QuestionType::Inferred
    } else {
        QuestionType::OutOfKb
    };

    let supporting_grade = match question_type {
        QuestionType::Known => Some(Grade::Direct),
        QuestionType::Inferred => Some(Grade::Partial),
        QuestionType::OutOfKb => None,
    };

    let supporting_passage_ids = supporting_grade
        .map(|wanted| {
            dataset
                .passages_for(topic_id)
                .into_iter()
                .filter(|(_, grade)| *grade == wanted)
                .map(|(passage, _)| passage.id.clone())
                .collect()
        })
        .unwrap_or_default();

    ClassificationResult {
        question_type,
        topic_id: Some(topic_id.to_string()),
        supporting_passage_ids,
        runners_up: match_result.runners_up.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GroundtruthLink;
    use crate::models::Passage;
    use crate::models::Topic;

    fn dataset() -> Dataset {
        let topic = |id: &str, question: &str| Topic {
            id: id.to_string(),
            canonical_question: question.to_string(),
            variants: vec![question.to_string()],
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
                topic("W01", "What metaphor does Romeo use?"),
                topic("W02", "How does Tybalt's attitude evolve?"),
                topic("W03", "Mixed grades topic"),
                topic("W50", "What if Romeo had a smartphone?"),
            ],
            vec![
                passage("P001", "W01", "Juliet is the sun"),
                passage("P005", "W02", "Tybalt calls Romeo a villain"),
                passage("P006", "W02", "Tybalt seeks Romeo at the feast"),
                passage("P010", "W03", "direct support"),
                passage("P011", "W03", "partial support"),
            ],
            vec![
                link("W01", "P001", Grade::Direct),
                link("W02", "P005", Grade::Partial),
                link("W02", "P006", Grade::Partial),
                link("W03", "P010", Grade::Direct),
                link("W03", "P011", Grade::Partial),
            ],
        )
        .unwrap()
    }

    fn matched(topic_id: Option<&str>) -> MatchResult {
        MatchResult {
            question: "q".to_string(),
            topic_id: topic_id.map(ToString::to_string),
            score: 0.9,
            runners_up: Vec::new(),
        }
    }

    #[test]
    fn test_grade_two_topic_is_known() {
        let result = classify(&dataset(), &matched(Some("W01")));
        assert_eq!(result.question_type, QuestionType::Known);
        assert_eq!(result.supporting_passage_ids, vec!["P001".to_string()]);
    }

    #[test]
    fn test_grade_one_only_topic_is_inferred() {
        let result = classify(&dataset(), &matched(Some("W02")));
        assert_eq!(result.question_type, QuestionType::Inferred);
        assert_eq!(
            result.supporting_passage_ids,
            vec!["P005".to_string(), "P006".to_string()]
        );
    }

    #[test]
    fn test_unlinked_topic_is_out_of_kb() {
        let result = classify(&dataset(), &matched(Some("W50")));
        assert_eq!(result.question_type, QuestionType::OutOfKb);
        assert!(result.supporting_passage_ids.is_empty());
    }

    #[test]
    fn test_null_topic_is_out_of_kb() {
        let result = classify(&dataset(), &matched(None));
        assert_eq!(result.question_type, QuestionType::OutOfKb);
        assert!(result.topic_id.is_none());
        assert!(result.supporting_passage_ids.is_empty());
    }

    #[test]
    fn test_mixed_grades_take_only_direct_passages() {
        let result = classify(&dataset(), &matched(Some("W03")));
        assert_eq!(result.question_type, QuestionType::Known);
        assert_eq!(result.supporting_passage_ids, vec!["P010".to_string()]);
    }

    #[test]
    fn test_same_topic_always_yields_same_type() {
        let ds = dataset();
        let first = classify(&ds, &matched(Some("W02")));
        let second = classify(&ds, &matched(Some("W02")));
        assert_eq!(first.question_type, second.question_type);
        assert_eq!(first.supporting_passage_ids, second.supporting_passage_ids);
    }
}
