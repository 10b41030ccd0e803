//! services/api/src/web/notes.rs
//!
//! Study notes generated from an uploaded document.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use lms_core::prompt::compose_notes_prompt;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::{course::PdfNoteResponse, rest::port_error_status, state::AppState};

#[derive(Serialize, ToSchema)]
pub struct NotesListResponse {
    pub notes: Vec<PdfNoteResponse>,
}

/// Generate notes from an uploaded document.
///
/// Accepts a multipart/form-data request with a single file part holding the
/// document's extracted text.
#[utoipa::path(
    post,
    path = "/api/pdf/{course_id}/notes",
    request_body(content_type = "multipart/form-data", description = "The document to summarise."),
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 201, description = "Notes generated", body = PdfNoteResponse),
        (status = 400, description = "Missing file, empty file, or not UTF-8 text"),
        (status = 404, description = "No such course"),
        (status = 502, description = "The AI model failed to respond")
    )
)]
pub async fn upload_notes_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(course_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let (file_name, file_text) =
        if let Some(field) = multipart.next_field().await.map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                format!("Failed to read multipart data: {}", e),
            )
        })? {
            let name = field.file_name().unwrap_or("document.txt").to_string();
            let data = field.bytes().await.map_err(|e| {
                (
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read file bytes: {}", e),
                )
            })?;
            let text = String::from_utf8(data.to_vec()).map_err(|e| {
                (
                    StatusCode::BAD_REQUEST,
                    format!("Uploaded file is not valid UTF-8 text: {}", e),
                )
            })?;
            (name, text)
        } else {
            return Err((
                StatusCode::BAD_REQUEST,
                "Multipart form must include a file".to_string(),
            ));
        };

    if file_text.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Uploaded file is empty".to_string()));
    }

    let course = state
        .db
        .get_course(user_id, course_id)
        .await
        .map_err(|e| (port_error_status(&e), e.to_string()))?;

    let notes = state
        .llm
        .generate_text(&compose_notes_prompt(&course.subject, &file_text))
        .await
        .map_err(|e| {
            error!("Notes generation failed: {:?}", e);
            (StatusCode::BAD_GATEWAY, "Failed to generate notes".to_string())
        })?;

    let note = state
        .db
        .save_pdf_note(course_id, &file_name, notes.trim())
        .await
        .map_err(|e| (port_error_status(&e), e.to_string()))?;
    info!("Stored notes from '{}' on course {}", file_name, course_id);

    Ok((StatusCode::CREATED, Json(PdfNoteResponse::from(note))))
}

#[utoipa::path(
    get,
    path = "/api/pdf/{course_id}/notes",
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Notes stored on the course", body = NotesListResponse),
        (status = 404, description = "No such course")
    )
)]
pub async fn list_notes_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<NotesListResponse>, (StatusCode, String)> {
    state
        .db
        .get_course(user_id, course_id)
        .await
        .map_err(|e| (port_error_status(&e), e.to_string()))?;
    let notes = state
        .db
        .get_pdf_notes(course_id)
        .await
        .map_err(|e| (port_error_status(&e), e.to_string()))?;

    Ok(Json(NotesListResponse {
        notes: notes.into_iter().map(Into::into).collect(),
    }))
}
