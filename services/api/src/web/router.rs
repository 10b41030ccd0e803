//! services/api/src/web/router.rs
//!
//! Assembles the complete HTTP application from the handlers.

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::web::{
    auth::{login_handler, logout_handler, me_handler, signup_handler},
    chatbot::chat_handler,
    course::{
        create_course_handler, delete_course_handler, get_course_handler, list_courses_handler,
        update_topic_handler,
    },
    dashboard::dashboard_handler,
    middleware::require_auth,
    notes::{list_notes_handler, upload_notes_handler},
    quiz::{generate_quiz_handler, get_quiz_handler, record_score_handler},
    rest::{health_handler, ApiDoc},
    state::AppState,
    timetable::{generate_timetable_handler, get_timetable_handler},
};

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(app_state.config.cors_origin.clone())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/", get(health_handler))
        .route("/api/auth/signup", post(signup_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/logout", post(logout_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/api/auth/me", get(me_handler))
        .route("/api/course", post(create_course_handler))
        .route("/api/course/my-courses", get(list_courses_handler))
        .route(
            "/api/course/{id}",
            get(get_course_handler).delete(delete_course_handler),
        )
        .route("/api/course/{id}/topics/{topic_id}", patch(update_topic_handler))
        .route("/api/dashboard", get(dashboard_handler))
        .route("/api/chatbot/chat", post(chat_handler))
        .route("/api/quiz/{course_id}", get(get_quiz_handler))
        .route("/api/quiz/{course_id}/generate", post(generate_quiz_handler))
        .route("/api/quiz/{course_id}/score", post(record_score_handler))
        .route(
            "/api/timetable/{course_id}",
            get(get_timetable_handler).post(generate_timetable_handler),
        )
        .route(
            "/api/pdf/{course_id}/notes",
            get(list_notes_handler).post(upload_notes_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
