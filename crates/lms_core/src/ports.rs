//! crates/lms_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, keeping the core
//! independent of the concrete database and generative-AI clients.

use crate::domain::{
    Course, Difficulty, NewTopic, PdfNote, Quiz, QuizQuestion, TestScore, Timetable, TopicStatus,
    User, UserCredentials,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Auth Methods ---
    async fn create_user(&self, name: &str, email: &str, hashed_password: &str)
        -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Returns the owner of a live session; expired sessions are `Unauthorized`.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Course Management ---
    async fn create_course(
        &self,
        user_id: Uuid,
        subject: &str,
        difficulty: Difficulty,
        topics: &[NewTopic],
    ) -> PortResult<Course>;

    /// All courses owned by the user, newest first.
    async fn get_courses_by_user(&self, user_id: Uuid) -> PortResult<Vec<Course>>;

    /// A course owned by `user_id`. Courses owned by someone else are `NotFound`.
    async fn get_course(&self, user_id: Uuid, course_id: Uuid) -> PortResult<Course>;

    async fn delete_course(&self, user_id: Uuid, course_id: Uuid) -> PortResult<()>;

    /// Sets a topic's status and refreshes the cached completed-topics count.
    async fn update_topic_status(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        topic_id: Uuid,
        status: TopicStatus,
    ) -> PortResult<Course>;

    async fn record_test_score(&self, course_id: Uuid, score: &TestScore) -> PortResult<()>;

    // --- Generated Artifacts ---
    async fn save_quiz(
        &self,
        course_id: Uuid,
        topic: Option<&str>,
        questions: &[QuizQuestion],
    ) -> PortResult<Quiz>;

    async fn get_latest_quiz(&self, course_id: Uuid) -> PortResult<Quiz>;

    async fn save_timetable(&self, course_id: Uuid, plan: &str) -> PortResult<Timetable>;

    async fn get_timetable(&self, course_id: Uuid) -> PortResult<Timetable>;

    async fn save_pdf_note(&self, course_id: Uuid, file_name: &str, notes: &str)
        -> PortResult<PdfNote>;

    async fn get_pdf_notes(&self, course_id: Uuid) -> PortResult<Vec<PdfNote>>;
}

#[async_trait]
pub trait TextGenerationService: Send + Sync {
    /// Sends a fully composed prompt to the model and returns its text reply unmodified.
    async fn generate_text(&self, prompt: &str) -> PortResult<String>;
}
