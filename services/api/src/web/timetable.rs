//! services/api/src/web/timetable.rs
//!
//! Study timetable generation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use lms_core::{prompt::compose_timetable_prompt, Timetable};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::{rest::port_error_status, state::AppState};

const MAX_HOURS_PER_DAY: f32 = 24.0;

#[derive(Deserialize, ToSchema)]
pub struct TimetableRequest {
    pub hours_per_day: f32,
    pub days: u32,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimetableResponse {
    pub id: Uuid,
    pub course_id: Uuid,
    pub plan: String,
    pub created_at: DateTime<Utc>,
}

impl From<Timetable> for TimetableResponse {
    fn from(t: Timetable) -> Self {
        Self {
            id: t.id,
            course_id: t.course_id,
            plan: t.plan,
            created_at: t.created_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/timetable/{course_id}",
    request_body = TimetableRequest,
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 201, description = "Timetable generated", body = TimetableResponse),
        (status = 400, description = "Non-positive hours or days"),
        (status = 404, description = "No such course"),
        (status = 502, description = "The AI model failed to respond")
    )
)]
pub async fn generate_timetable_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(course_id): Path<Uuid>,
    Json(req): Json<TimetableRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if !(req.hours_per_day > 0.0 && req.hours_per_day <= MAX_HOURS_PER_DAY) || req.days == 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            "hours_per_day must be in (0, 24] and days must be positive".to_string(),
        ));
    }

    let course = state
        .db
        .get_course(user_id, course_id)
        .await
        .map_err(|e| (port_error_status(&e), e.to_string()))?;

    let plan = state
        .llm
        .generate_text(&compose_timetable_prompt(&course, req.hours_per_day, req.days))
        .await
        .map_err(|e| {
            error!("Timetable generation failed: {:?}", e);
            (StatusCode::BAD_GATEWAY, "Failed to generate timetable".to_string())
        })?;

    let timetable = state
        .db
        .save_timetable(course_id, plan.trim())
        .await
        .map_err(|e| (port_error_status(&e), e.to_string()))?;
    info!("Generated timetable for course {}", course_id);

    Ok((StatusCode::CREATED, Json(TimetableResponse::from(timetable))))
}

#[utoipa::path(
    get,
    path = "/api/timetable/{course_id}",
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "The stored timetable", body = TimetableResponse),
        (status = 404, description = "No such course, or no timetable yet")
    )
)]
pub async fn get_timetable_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<TimetableResponse>, (StatusCode, String)> {
    state
        .db
        .get_course(user_id, course_id)
        .await
        .map_err(|e| (port_error_status(&e), e.to_string()))?;
    let timetable = state
        .db
        .get_timetable(course_id)
        .await
        .map_err(|e| (port_error_status(&e), e.to_string()))?;
    Ok(Json(timetable.into()))
}
