//! services/api/src/web/quiz.rs
//!
//! Quiz generation and score recording.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use lms_core::{parse::parse_quiz, prompt::compose_quiz_prompt, Quiz, QuizQuestion, TestScore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::{
    rest::{port_error_status, MessageResponse},
    state::AppState,
};

const DEFAULT_QUESTIONS: usize = 5;
const MAX_QUESTIONS: usize = 20;
const MAX_SCORE: u32 = 100;

#[derive(Deserialize, ToSchema, Default)]
pub struct GenerateQuizRequest {
    /// Restrict the quiz to one topic; the whole course otherwise.
    pub topic: Option<String>,
    pub questions: Option<usize>,
}

#[derive(Deserialize, ToSchema)]
pub struct RecordScoreRequest {
    pub topic: String,
    pub score: u32,
}

#[derive(Serialize, ToSchema)]
pub struct QuestionResponse {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

impl From<QuizQuestion> for QuestionResponse {
    fn from(q: QuizQuestion) -> Self {
        Self {
            question: q.question,
            options: q.options,
            answer: q.answer,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizResponse {
    pub id: Uuid,
    pub course_id: Uuid,
    pub topic: Option<String>,
    pub questions: Vec<QuestionResponse>,
    pub created_at: DateTime<Utc>,
}

impl From<Quiz> for QuizResponse {
    fn from(quiz: Quiz) -> Self {
        Self {
            id: quiz.id,
            course_id: quiz.course_id,
            topic: quiz.topic,
            questions: quiz.questions.into_iter().map(Into::into).collect(),
            created_at: quiz.created_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/quiz/{course_id}/generate",
    request_body(content = GenerateQuizRequest, description = "Optional; omit the body to cover the whole course."),
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 201, description = "Quiz generated", body = QuizResponse),
        (status = 404, description = "No such course"),
        (status = 502, description = "The AI model failed to produce a usable quiz")
    )
)]
pub async fn generate_quiz_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(course_id): Path<Uuid>,
    body: Option<Json<GenerateQuizRequest>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // No body asks for a quiz over the whole course.
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let course = state
        .db
        .get_course(user_id, course_id)
        .await
        .map_err(|e| (port_error_status(&e), e.to_string()))?;

    let topic = req.topic.as_deref().map(str::trim).filter(|t| !t.is_empty());
    let count = req.questions.unwrap_or(DEFAULT_QUESTIONS).clamp(1, MAX_QUESTIONS);

    let reply = state
        .llm
        .generate_text(&compose_quiz_prompt(&course, topic, count))
        .await
        .map_err(|e| {
            error!("Quiz generation failed: {:?}", e);
            (StatusCode::BAD_GATEWAY, "Failed to generate quiz".to_string())
        })?;
    let questions = parse_quiz(&reply).map_err(|e| {
        error!("Unusable quiz reply for course {}: {:?}", course_id, e);
        (StatusCode::BAD_GATEWAY, "Failed to generate quiz".to_string())
    })?;

    let quiz = state
        .db
        .save_quiz(course_id, topic, &questions)
        .await
        .map_err(|e| (port_error_status(&e), e.to_string()))?;
    info!("Generated a {}-question quiz for course {}", quiz.questions.len(), course_id);

    Ok((StatusCode::CREATED, Json(QuizResponse::from(quiz))))
}

#[utoipa::path(
    get,
    path = "/api/quiz/{course_id}",
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "The most recent quiz", body = QuizResponse),
        (status = 404, description = "No such course, or no quiz yet")
    )
)]
pub async fn get_quiz_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<QuizResponse>, (StatusCode, String)> {
    state
        .db
        .get_course(user_id, course_id)
        .await
        .map_err(|e| (port_error_status(&e), e.to_string()))?;
    let quiz = state
        .db
        .get_latest_quiz(course_id)
        .await
        .map_err(|e| (port_error_status(&e), e.to_string()))?;
    Ok(Json(quiz.into()))
}

/// Record a quiz result; recorded scores feed the dashboard chart.
#[utoipa::path(
    post,
    path = "/api/quiz/{course_id}/score",
    request_body = RecordScoreRequest,
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 201, description = "Score recorded", body = MessageResponse),
        (status = 400, description = "Missing topic or score above 100"),
        (status = 404, description = "No such course")
    )
)]
pub async fn record_score_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(course_id): Path<Uuid>,
    Json(req): Json<RecordScoreRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let topic = req.topic.trim();
    if topic.is_empty() || req.score > MAX_SCORE {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("A topic and a score between 0 and {} are required", MAX_SCORE),
        ));
    }

    state
        .db
        .get_course(user_id, course_id)
        .await
        .map_err(|e| (port_error_status(&e), e.to_string()))?;
    state
        .db
        .record_test_score(course_id, &TestScore::new(topic, req.score))
        .await
        .map_err(|e| {
            error!("Failed to record score: {:?}", e);
            (port_error_status(&e), "Failed to record score".to_string())
        })?;

    Ok((StatusCode::CREATED, Json(MessageResponse::new("Score recorded"))))
}
