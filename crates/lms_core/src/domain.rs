//! crates/lms_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or wire format.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The level a course is pitched at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value '{0}'")]
pub struct UnknownVariant(pub String);

impl FromStr for Difficulty {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

/// Where a learner is with a single topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TopicStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl TopicStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopicStatus::NotStarted => "not-started",
            TopicStatus::InProgress => "in-progress",
            TopicStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TopicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TopicStatus {
    type Err = UnknownVariant;

    /// Accepts both the hyphenated labels and the older `complete`/`pending` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "not-started" | "pending" => Ok(TopicStatus::NotStarted),
            "in-progress" => Ok(TopicStatus::InProgress),
            "completed" | "complete" => Ok(TopicStatus::Completed),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

/// A gradable unit of content within a course.
#[derive(Debug, Clone, PartialEq)]
pub struct Topic {
    pub id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub estimated_hours: Option<f32>,
    pub status: TopicStatus,
}

/// A topic as proposed by the syllabus generator, before it has an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTopic {
    pub title: String,
    pub content: Option<String>,
    pub estimated_hours: Option<f32>,
}

/// A recorded quiz or test result for one topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestScore {
    pub topic: String,
    pub score: u32,
}

impl TestScore {
    pub fn new(topic: impl Into<String>, score: u32) -> Self {
        Self {
            topic: topic.into(),
            score,
        }
    }
}

/// The cached progress summary stored alongside a course.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseProgress {
    /// `None` when nothing has been recorded yet; the count is then derived from topic statuses.
    pub completed_topics: Option<usize>,
    pub test_scores: Vec<TestScore>,
}

/// Study notes generated from an uploaded document.
#[derive(Debug, Clone)]
pub struct PdfNote {
    pub id: Uuid,
    pub course_id: Uuid,
    pub file_name: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// A user-owned learning unit.
#[derive(Debug, Clone)]
pub struct Course {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject: String,
    pub difficulty: Difficulty,
    pub topics: Vec<Topic>,
    pub progress: CourseProgress,
    pub has_quiz: bool,
    pub has_timetable: bool,
    pub pdf_notes: Vec<PdfNote>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

#[derive(Debug, Clone)]
pub struct Quiz {
    pub id: Uuid,
    pub course_id: Uuid,
    pub topic: Option<String>,
    pub questions: Vec<QuizQuestion>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Timetable {
    pub id: Uuid,
    pub course_id: Uuid,
    pub plan: String,
    pub created_at: DateTime<Utc>,
}

// Represents a user - used throughout app
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}
