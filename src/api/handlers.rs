//! API handlers

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::error;
use tracing::info;

use crate::api::types::ApiResponse;
use crate::api::types::AskRequest;
use crate::api::types::AskResponse;
use crate::api::types::HealthResponse;
use crate::api::types::StatsResponse;
use crate::models::Grade;
use crate::qa::QaService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub qa: Arc<QaService>,
}

/// Health check
pub async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// Answer a question
pub async fn ask(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> Result<Json<ApiResponse<AskResponse>>, (StatusCode, Json<ApiResponse<AskResponse>>)> {
    let question = req.question.trim().to_string();
    if question.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Question cannot be empty")),
        ));
    }

    info!("POST /api/ask: {}", question);

    match state.qa.ask(&question).await {
        Ok(answer) => Ok(Json(ApiResponse::success(AskResponse {
            question,
            answer: answer.answer.clone(),
            question_type: answer.question_type(),
            source_passage_ids: answer.source_passage_ids,
        }))),
        Err(e) => {
            error!("Error processing question: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(e.to_string())),
            ))
        }
    }
}

/// Dataset statistics
pub async fn stats(State(state): State<AppState>) -> Json<ApiResponse<StatsResponse>> {
    let dataset = state.qa.dataset();

    let mut known = 0;
    let mut inferred = 0;
    let mut out_of_kb = 0;
    for topic in dataset.topics() {
        let grades = dataset.grades_for(&topic.id);
        if grades.contains(&Grade::Direct) {
            known += 1;
        } else if grades.contains(&Grade::Partial) {
            inferred += 1;
        } else {
            out_of_kb += 1;
        }
    }

    Json(ApiResponse::success(StatsResponse {
        topics: dataset.topic_count(),
        passages: dataset.passage_count(),
        known_topics: known,
        inferred_topics: inferred,
        out_of_kb_topics: out_of_kb,
    }))
}
