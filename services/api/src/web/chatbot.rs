//! services/api/src/web/chatbot.rs
//!
//! The tutoring chatbot. Answers are grounded in the topics of the user's courses.

use axum::{extract::State, http::StatusCode, Extension, Json};
use lms_core::prompt::{compose_chat_prompt, join_topic_titles};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::state::AppState;

pub const CHATBOT_FAILURE_MESSAGE: &str = "Chatbot failed to respond";

#[derive(Deserialize, ToSchema)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct ChatResponse {
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct ChatErrorResponse {
    pub message: String,
    pub error: String,
}

#[utoipa::path(
    post,
    path = "/api/chatbot/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "The model's answer, verbatim", body = ChatResponse),
        (status = 500, description = "The courses or the model could not be reached", body = ChatErrorResponse)
    )
)]
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ChatErrorResponse>)> {
    let failure = |details: String| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ChatErrorResponse {
                message: CHATBOT_FAILURE_MESSAGE.to_string(),
                error: details,
            }),
        )
    };

    let courses = state.db.get_courses_by_user(user_id).await.map_err(|e| {
        error!("❌ Chatbot could not load courses: {:?}", e);
        failure(e.to_string())
    })?;

    let prompt = compose_chat_prompt(&join_topic_titles(&courses), &req.message);
    let text = state.llm.generate_text(&prompt).await.map_err(|e| {
        error!("❌ Chatbot error: {:?}", e);
        failure(e.to_string())
    })?;

    Ok(Json(ChatResponse { message: text }))
}
