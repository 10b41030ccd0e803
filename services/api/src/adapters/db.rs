//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lms_core::domain::{
    Course, CourseProgress, Difficulty, NewTopic, PdfNote, Quiz, QuizQuestion, TestScore,
    Timetable, Topic, TopicStatus, User, UserCredentials,
};
use lms_core::ports::{DatabaseService, PortError, PortResult};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};
use std::collections::HashMap;
use tracing::warn;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Loads topics, scores and notes for the given course rows and assembles them.
    async fn hydrate(&self, records: Vec<CourseRecord>) -> PortResult<Vec<Course>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = records.iter().map(|r| r.id).collect();

        let topics = sqlx::query_as::<_, TopicRecord>(
            "SELECT id, course_id, title, content, estimated_hours, status FROM topics \
             WHERE course_id = ANY($1) ORDER BY course_id, position ASC",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let scores = sqlx::query_as::<_, TestScoreRecord>(
            "SELECT course_id, topic, score FROM test_scores \
             WHERE course_id = ANY($1) ORDER BY recorded_at ASC, id ASC",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let notes = sqlx::query_as::<_, PdfNoteRecord>(
            "SELECT id, course_id, file_name, notes, created_at FROM pdf_notes \
             WHERE course_id = ANY($1) ORDER BY created_at ASC",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let mut topics_by_course: HashMap<Uuid, Vec<Topic>> = HashMap::new();
        for t in topics {
            topics_by_course.entry(t.course_id).or_default().push(t.to_domain());
        }
        let mut scores_by_course: HashMap<Uuid, Vec<TestScore>> = HashMap::new();
        for s in scores {
            scores_by_course.entry(s.course_id).or_default().push(s.to_domain());
        }
        let mut notes_by_course: HashMap<Uuid, Vec<PdfNote>> = HashMap::new();
        for n in notes {
            notes_by_course.entry(n.course_id).or_default().push(n.to_domain());
        }

        Ok(records
            .into_iter()
            .map(|r| {
                let topics = topics_by_course.remove(&r.id).unwrap_or_default();
                let scores = scores_by_course.remove(&r.id).unwrap_or_default();
                let notes = notes_by_course.remove(&r.id).unwrap_or_default();
                r.to_domain(topics, scores, notes)
            })
            .collect())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn not_found_or_unexpected(e: sqlx::Error, what: String) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what),
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    name: String,
    email: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            user_id: self.user_id,
            name: self.name,
            email: self.email,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    user_id: Uuid,
    email: String,
    hashed_password: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.user_id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct AuthSessionRecord {
    user_id: Uuid,
    expires_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct CourseRecord {
    id: Uuid,
    user_id: Uuid,
    subject: String,
    difficulty: String,
    completed_topics: Option<i32>,
    has_quiz: bool,
    has_timetable: bool,
    created_at: DateTime<Utc>,
}
impl CourseRecord {
    fn to_domain(self, topics: Vec<Topic>, test_scores: Vec<TestScore>, pdf_notes: Vec<PdfNote>) -> Course {
        let difficulty = self.difficulty.parse::<Difficulty>().unwrap_or_else(|e| {
            warn!("Course {} has {}; treating it as beginner", self.id, e);
            Difficulty::Beginner
        });
        Course {
            id: self.id,
            user_id: self.user_id,
            subject: self.subject,
            difficulty,
            topics,
            progress: CourseProgress {
                // A negative count is malformed and reads as zero.
                completed_topics: self
                    .completed_topics
                    .map(|n| usize::try_from(n).unwrap_or(0)),
                test_scores,
            },
            has_quiz: self.has_quiz,
            has_timetable: self.has_timetable,
            pdf_notes,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct TopicRecord {
    id: Uuid,
    course_id: Uuid,
    title: String,
    content: Option<String>,
    estimated_hours: Option<f32>,
    status: String,
}
impl TopicRecord {
    fn to_domain(self) -> Topic {
        Topic {
            id: self.id,
            title: self.title,
            content: self.content,
            estimated_hours: self.estimated_hours,
            status: self.status.parse().unwrap_or_default(),
        }
    }
}

#[derive(FromRow)]
struct TestScoreRecord {
    course_id: Uuid,
    topic: String,
    score: i32,
}
impl TestScoreRecord {
    fn to_domain(self) -> TestScore {
        TestScore::new(self.topic, u32::try_from(self.score).unwrap_or(0))
    }
}

#[derive(FromRow)]
struct PdfNoteRecord {
    id: Uuid,
    course_id: Uuid,
    file_name: String,
    notes: String,
    created_at: DateTime<Utc>,
}
impl PdfNoteRecord {
    fn to_domain(self) -> PdfNote {
        PdfNote {
            id: self.id,
            course_id: self.course_id,
            file_name: self.file_name,
            notes: self.notes,
            created_at: self.created_at,
        }
    }
}

/// JSONB shape of one stored quiz question.
#[derive(Serialize, Deserialize)]
struct QuestionRecord {
    question: String,
    options: Vec<String>,
    answer: String,
}

#[derive(FromRow)]
struct QuizRecord {
    id: Uuid,
    course_id: Uuid,
    topic: Option<String>,
    questions: Json<Vec<QuestionRecord>>,
    created_at: DateTime<Utc>,
}
impl QuizRecord {
    fn to_domain(self) -> Quiz {
        Quiz {
            id: self.id,
            course_id: self.course_id,
            topic: self.topic,
            questions: self
                .questions
                .0
                .into_iter()
                .map(|q| QuizQuestion {
                    question: q.question,
                    options: q.options,
                    answer: q.answer,
                })
                .collect(),
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct TimetableRecord {
    id: Uuid,
    course_id: Uuid,
    plan: String,
    created_at: DateTime<Utc>,
}
impl TimetableRecord {
    fn to_domain(self) -> Timetable {
        Timetable {
            id: self.id,
            course_id: self.course_id,
            plan: self.plan,
            created_at: self.created_at,
        }
    }
}

const COURSE_COLUMNS: &str =
    "id, user_id, subject, difficulty, completed_topics, has_quiz, has_timetable, created_at";

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (user_id, name, email, hashed_password) VALUES ($1, $2, $3, $4) \
             RETURNING user_id, name, email",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                PortError::InvalidInput(format!("Email {} is already registered", email))
            }
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT user_id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("User {} not found", email)))?;
        Ok(record.to_domain())
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT user_id, name, email FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("User {} not found", user_id)))?;
        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let record = sqlx::query_as::<_, AuthSessionRecord>(
            "SELECT user_id, expires_at FROM auth_sessions WHERE id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or(PortError::Unauthorized)?;

        if record.expires_at <= Utc::now() {
            self.delete_auth_session(session_id).await?;
            return Err(PortError::Unauthorized);
        }
        Ok(record.user_id)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn create_course(
        &self,
        user_id: Uuid,
        subject: &str,
        difficulty: Difficulty,
        topics: &[NewTopic],
    ) -> PortResult<Course> {
        let course_id = Uuid::new_v4();
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        sqlx::query("INSERT INTO courses (id, user_id, subject, difficulty) VALUES ($1, $2, $3, $4)")
            .bind(course_id)
            .bind(user_id)
            .bind(subject)
            .bind(difficulty.as_str())
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        for (position, topic) in topics.iter().enumerate() {
            sqlx::query(
                "INSERT INTO topics (id, course_id, position, title, content, estimated_hours, status) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(Uuid::new_v4())
            .bind(course_id)
            .bind(position as i32)
            .bind(&topic.title)
            .bind(&topic.content)
            .bind(topic.estimated_hours)
            .bind(TopicStatus::NotStarted.as_str())
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        }

        tx.commit().await.map_err(unexpected)?;
        self.get_course(user_id, course_id).await
    }

    async fn get_courses_by_user(&self, user_id: Uuid) -> PortResult<Vec<Course>> {
        let records = sqlx::query_as::<_, CourseRecord>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        self.hydrate(records).await
    }

    async fn get_course(&self, user_id: Uuid, course_id: Uuid) -> PortResult<Course> {
        let record = sqlx::query_as::<_, CourseRecord>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1 AND user_id = $2"
        ))
        .bind(course_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("Course {} not found", course_id)))?;

        self.hydrate(vec![record])
            .await?
            .pop()
            .ok_or_else(|| PortError::NotFound(format!("Course {} not found", course_id)))
    }

    async fn delete_course(&self, user_id: Uuid, course_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1 AND user_id = $2")
            .bind(course_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Course {} not found", course_id)));
        }
        Ok(())
    }

    async fn update_topic_status(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        topic_id: Uuid,
        status: TopicStatus,
    ) -> PortResult<Course> {
        // Ownership check first; someone else's course reads as missing.
        self.get_course(user_id, course_id).await?;

        let mut tx = self.pool.begin().await.map_err(unexpected)?;
        let result = sqlx::query("UPDATE topics SET status = $1 WHERE id = $2 AND course_id = $3")
            .bind(status.as_str())
            .bind(topic_id)
            .bind(course_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Topic {} not found", topic_id)));
        }

        sqlx::query(
            "UPDATE courses SET completed_topics = \
             (SELECT COUNT(*) FROM topics WHERE course_id = $1 AND status = $2) WHERE id = $1",
        )
        .bind(course_id)
        .bind(TopicStatus::Completed.as_str())
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;

        tx.commit().await.map_err(unexpected)?;
        self.get_course(user_id, course_id).await
    }

    async fn record_test_score(&self, course_id: Uuid, score: &TestScore) -> PortResult<()> {
        sqlx::query("INSERT INTO test_scores (course_id, topic, score) VALUES ($1, $2, $3)")
            .bind(course_id)
            .bind(&score.topic)
            .bind(i32::try_from(score.score).unwrap_or(i32::MAX))
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn save_quiz(
        &self,
        course_id: Uuid,
        topic: Option<&str>,
        questions: &[QuizQuestion],
    ) -> PortResult<Quiz> {
        let stored: Vec<QuestionRecord> = questions
            .iter()
            .map(|q| QuestionRecord {
                question: q.question.clone(),
                options: q.options.clone(),
                answer: q.answer.clone(),
            })
            .collect();

        let mut tx = self.pool.begin().await.map_err(unexpected)?;
        let record = sqlx::query_as::<_, QuizRecord>(
            "INSERT INTO quizzes (id, course_id, topic, questions) VALUES ($1, $2, $3, $4) \
             RETURNING id, course_id, topic, questions, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(course_id)
        .bind(topic)
        .bind(Json(stored))
        .fetch_one(&mut *tx)
        .await
        .map_err(unexpected)?;

        sqlx::query("UPDATE courses SET has_quiz = TRUE WHERE id = $1")
            .bind(course_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        tx.commit().await.map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_latest_quiz(&self, course_id: Uuid) -> PortResult<Quiz> {
        let record = sqlx::query_as::<_, QuizRecord>(
            "SELECT id, course_id, topic, questions, created_at FROM quizzes \
             WHERE course_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(course_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("No quiz for course {}", course_id)))?;
        Ok(record.to_domain())
    }

    async fn save_timetable(&self, course_id: Uuid, plan: &str) -> PortResult<Timetable> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;
        let record = sqlx::query_as::<_, TimetableRecord>(
            "INSERT INTO timetables (id, course_id, plan) VALUES ($1, $2, $3) \
             ON CONFLICT (course_id) DO UPDATE SET plan = EXCLUDED.plan, created_at = now() \
             RETURNING id, course_id, plan, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(course_id)
        .bind(plan)
        .fetch_one(&mut *tx)
        .await
        .map_err(unexpected)?;

        sqlx::query("UPDATE courses SET has_timetable = TRUE WHERE id = $1")
            .bind(course_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        tx.commit().await.map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_timetable(&self, course_id: Uuid) -> PortResult<Timetable> {
        let record = sqlx::query_as::<_, TimetableRecord>(
            "SELECT id, course_id, plan, created_at FROM timetables WHERE course_id = $1",
        )
        .bind(course_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            not_found_or_unexpected(e, format!("No timetable for course {}", course_id))
        })?;
        Ok(record.to_domain())
    }

    async fn save_pdf_note(
        &self,
        course_id: Uuid,
        file_name: &str,
        notes: &str,
    ) -> PortResult<PdfNote> {
        let record = sqlx::query_as::<_, PdfNoteRecord>(
            "INSERT INTO pdf_notes (id, course_id, file_name, notes) VALUES ($1, $2, $3, $4) \
             RETURNING id, course_id, file_name, notes, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(course_id)
        .bind(file_name)
        .bind(notes)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_pdf_notes(&self, course_id: Uuid) -> PortResult<Vec<PdfNote>> {
        let records = sqlx::query_as::<_, PdfNoteRecord>(
            "SELECT id, course_id, file_name, notes, created_at FROM pdf_notes \
             WHERE course_id = $1 ORDER BY created_at ASC",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }
}
