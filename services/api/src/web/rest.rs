//! services/api/src/web/rest.rs
//!
//! Shared pieces of the REST API: the master OpenAPI definition, the generic
//! message payload and the mapping from port errors to HTTP status codes.

use axum::http::StatusCode;
use lms_core::ports::PortError;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::web::{auth, chatbot, course, dashboard, notes, quiz, timetable};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::me_handler,
        course::create_course_handler,
        course::list_courses_handler,
        course::get_course_handler,
        course::delete_course_handler,
        course::update_topic_handler,
        dashboard::dashboard_handler,
        chatbot::chat_handler,
        quiz::generate_quiz_handler,
        quiz::get_quiz_handler,
        quiz::record_score_handler,
        timetable::generate_timetable_handler,
        timetable::get_timetable_handler,
        notes::upload_notes_handler,
        notes::list_notes_handler,
    ),
    components(
        schemas(
            MessageResponse,
            auth::SignupRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            auth::ProfileResponse,
            course::CreateCourseRequest,
            course::UpdateTopicRequest,
            course::CourseResponse,
            course::CourseListResponse,
            course::TopicResponse,
            course::ProgressResponse,
            course::ScoreResponse,
            course::PdfNoteResponse,
            dashboard::DashboardResponse,
            dashboard::CourseStatsResponse,
            chatbot::ChatRequest,
            chatbot::ChatResponse,
            chatbot::ChatErrorResponse,
            quiz::GenerateQuizRequest,
            quiz::RecordScoreRequest,
            quiz::QuizResponse,
            quiz::QuestionResponse,
            timetable::TimetableRequest,
            timetable::TimetableResponse,
            notes::NotesListResponse,
        )
    ),
    tags(
        (name = "AI LMS API", description = "Courses, progress dashboards and AI-generated study material.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Shared Payloads and Helpers
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub fn port_error_status(err: &PortError) -> StatusCode {
    match err {
        PortError::NotFound(_) => StatusCode::NOT_FOUND,
        PortError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        PortError::Unauthorized => StatusCode::UNAUTHORIZED,
        PortError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Liveness check.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "The service is up", body = String))
)]
pub async fn health_handler() -> &'static str {
    "AI LMS Backend is live"
}
