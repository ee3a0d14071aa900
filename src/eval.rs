//! Batch evaluation over the ask pipeline
//!
//! Replays a question list through [`QaService::ask`] and emits one record
//! per question for comparison against a held-out relevance table.

use std::io::BufRead;
use std::io::Write;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use tracing::info;

use crate::errors::Result;
use crate::models::QuestionType;
use crate::qa::QaService;

/// One evaluation record, in input order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalRecord {
    pub question: String,
    pub matched_topic: Option<String>,
    pub question_type: QuestionType,
    pub chosen_passage_ids: Vec<String>,
}

/// Run every question through the service, preserving input order
pub async fn run_batch(service: &QaService, questions: &[String]) -> Result<Vec<EvalRecord>> {
    info!("Running evaluation batch of {} questions", questions.len());

    let mut records = Vec::with_capacity(questions.len());
    for question in questions {
        let answer = service.ask(question).await?;
        records.push(EvalRecord {
            question: question.clone(),
            matched_topic: answer.classification.topic_id.clone(),
            question_type: answer.question_type(),
            chosen_passage_ids: answer.source_passage_ids,
        });
    }

    Ok(records)
}

/// Write records as JSON lines
pub fn write_jsonl<W: Write>(records: &[EvalRecord], mut writer: W) -> Result<()> {
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writeln!(writer)?;
    }
    Ok(())
}

/// Load a question list, one per line, skipping blanks
pub fn load_questions<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);

    let mut questions = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            questions.push(trimmed.to_string());
        }
    }
    Ok(questions)
}
