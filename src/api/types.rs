//! API request and response types

use serde::Deserialize;
use serde::Serialize;

use crate::models::QuestionType;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Ask request
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// Ask response
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub question: String,
    pub answer: String,
    pub question_type: QuestionType,
    pub source_passage_ids: Vec<String>,
}

/// Dataset statistics response
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub topics: usize,
    pub passages: usize,
    pub known_topics: usize,
    pub inferred_topics: usize,
    pub out_of_kb_topics: usize,
}
