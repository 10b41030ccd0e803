//! services/api/src/web/course.rs
//!
//! Course management endpoints and the JSON views of a course.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use lms_core::{
    classify, parse::parse_topic_lines, progress::aggregate, prompt::compose_topics_prompt,
    Course, Difficulty, PdfNote, TestScore, Topic, TopicStatus,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::{
    rest::{port_error_status, MessageResponse},
    state::AppState,
};

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreateCourseRequest {
    pub subject: String,
    /// One of `beginner`, `intermediate`, `advanced`.
    pub difficulty: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateTopicRequest {
    /// One of `not-started`, `in-progress`, `completed`.
    pub status: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopicResponse {
    pub id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub estimated_hours: Option<f32>,
    pub status: String,
}

impl From<Topic> for TopicResponse {
    fn from(topic: Topic) -> Self {
        Self {
            id: topic.id,
            title: topic.title,
            content: topic.content,
            estimated_hours: topic.estimated_hours,
            status: topic.status.to_string(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug, PartialEq)]
pub struct ScoreResponse {
    pub topic: String,
    pub score: u32,
}

impl From<TestScore> for ScoreResponse {
    fn from(score: TestScore) -> Self {
        Self {
            topic: score.topic,
            score: score.score,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub completed_topics: usize,
    pub total_topics: usize,
    pub percent: f64,
    pub test_scores: Vec<ScoreResponse>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PdfNoteResponse {
    pub id: Uuid,
    pub file_name: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl From<PdfNote> for PdfNoteResponse {
    fn from(note: PdfNote) -> Self {
        Self {
            id: note.id,
            file_name: note.file_name,
            notes: note.notes,
            created_at: note.created_at,
        }
    }
}

/// A course together with its derived progress and classification.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    pub id: Uuid,
    pub subject: String,
    pub difficulty: String,
    /// `completed`, `in-progress` or `not-started`.
    pub status: String,
    pub progress: ProgressResponse,
    pub topics: Vec<TopicResponse>,
    pub has_quiz: bool,
    pub has_timetable: bool,
    pub has_pdf_notes: bool,
    pub pdf_notes: Vec<PdfNoteResponse>,
    pub created_at: DateTime<Utc>,
}

impl From<Course> for CourseResponse {
    fn from(course: Course) -> Self {
        let summary = aggregate(&course);
        Self {
            id: course.id,
            subject: course.subject,
            difficulty: course.difficulty.to_string(),
            status: classify(summary).to_string(),
            progress: ProgressResponse {
                completed_topics: summary.completed_topics,
                total_topics: summary.total_topics,
                percent: summary.percent(),
                test_scores: course.progress.test_scores.into_iter().map(Into::into).collect(),
            },
            topics: course.topics.into_iter().map(Into::into).collect(),
            has_quiz: course.has_quiz,
            has_timetable: course.has_timetable,
            has_pdf_notes: !course.pdf_notes.is_empty(),
            pdf_notes: course.pdf_notes.into_iter().map(Into::into).collect(),
            created_at: course.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct CourseListResponse {
    pub courses: Vec<CourseResponse>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Create a course; its topics are generated by the AI model.
#[utoipa::path(
    post,
    path = "/api/course",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = CourseResponse),
        (status = 400, description = "Missing subject or unknown difficulty"),
        (status = 502, description = "The AI model failed to produce a syllabus")
    )
)]
pub async fn create_course_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<CreateCourseRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let subject = req.subject.trim();
    if subject.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Subject is required".to_string()));
    }
    let difficulty = req
        .difficulty
        .parse::<Difficulty>()
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Invalid difficulty: {}", e)))?;

    let reply = state
        .llm
        .generate_text(&compose_topics_prompt(subject, difficulty))
        .await
        .map_err(|e| {
            error!("Syllabus generation failed: {:?}", e);
            (StatusCode::BAD_GATEWAY, "Failed to generate course topics".to_string())
        })?;

    let topics = parse_topic_lines(&reply);
    if topics.is_empty() {
        warn!("Syllabus reply for '{}' contained no topics", subject);
        return Err((StatusCode::BAD_GATEWAY, "Failed to generate course topics".to_string()));
    }

    let course = state
        .db
        .create_course(user_id, subject, difficulty, &topics)
        .await
        .map_err(|e| {
            error!("Failed to create course: {:?}", e);
            (port_error_status(&e), "Failed to create course".to_string())
        })?;
    info!("Created course {} with {} topics for user {}", course.id, course.topics.len(), user_id);

    Ok((StatusCode::CREATED, Json(CourseResponse::from(course))))
}

/// List the signed-in user's courses, newest first.
#[utoipa::path(
    get,
    path = "/api/course/my-courses",
    responses(
        (status = 200, description = "The user's courses", body = CourseListResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_courses_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<CourseListResponse>, (StatusCode, String)> {
    let courses = state.db.get_courses_by_user(user_id).await.map_err(|e| {
        error!("Failed to list courses: {:?}", e);
        (port_error_status(&e), "Failed to load courses".to_string())
    })?;

    Ok(Json(CourseListResponse {
        courses: courses.into_iter().map(CourseResponse::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/course/{id}",
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "The course", body = CourseResponse),
        (status = 404, description = "No such course")
    )
)]
pub async fn get_course_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<CourseResponse>, (StatusCode, String)> {
    let course = state
        .db
        .get_course(user_id, course_id)
        .await
        .map_err(|e| (port_error_status(&e), e.to_string()))?;
    Ok(Json(course.into()))
}

#[utoipa::path(
    delete,
    path = "/api/course/{id}",
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course deleted", body = MessageResponse),
        (status = 404, description = "No such course")
    )
)]
pub async fn delete_course_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    state
        .db
        .delete_course(user_id, course_id)
        .await
        .map_err(|e| (port_error_status(&e), e.to_string()))?;
    info!("Deleted course {} for user {}", course_id, user_id);
    Ok(Json(MessageResponse::new("Course deleted successfully")))
}

/// Set a topic's status; the course's completed count is refreshed.
#[utoipa::path(
    patch,
    path = "/api/course/{id}/topics/{topic_id}",
    request_body = UpdateTopicRequest,
    params(
        ("id" = Uuid, Path, description = "Course id"),
        ("topic_id" = Uuid, Path, description = "Topic id")
    ),
    responses(
        (status = 200, description = "The updated course", body = CourseResponse),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "No such course or topic")
    )
)]
pub async fn update_topic_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path((course_id, topic_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateTopicRequest>,
) -> Result<Json<CourseResponse>, (StatusCode, String)> {
    let status = req
        .status
        .parse::<TopicStatus>()
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Invalid status: {}", e)))?;

    let course = state
        .db
        .update_topic_status(user_id, course_id, topic_id, status)
        .await
        .map_err(|e| (port_error_status(&e), e.to_string()))?;
    Ok(Json(course.into()))
}
