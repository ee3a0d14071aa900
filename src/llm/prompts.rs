//! Prompt templates for answer generation

/// Prompt for synthesizing an Inferred answer from multiple passages
#[must_use]
pub fn inferred_synthesis(question: &str, passages: &[String]) -> String {
    let context = passages
        .iter()
        .enumerate()
        .map(|(idx, p)| format!("Passage {}: {p}", idx + 1))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r"Question: {question}

Context from Romeo and Juliet:
{context}

Please provide a comprehensive answer by synthesizing information from the passages above."
    )
}

/// Prompt for answering an Out-of-KB question from general knowledge
#[must_use]
pub fn out_of_kb(question: &str) -> String {
    format!(
        r"Question: {question}

This question is about Romeo and Juliet but requires inference beyond the provided text.
Please answer based on your general knowledge of the play, or explain why this cannot be answered."
    )
}
