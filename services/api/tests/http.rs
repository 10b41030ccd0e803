//! Router-level tests against in-memory fakes of the database and the AI model.

use api_lib::{config::Config, web::build_router, web::state::AppState};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use lms_core::{
    domain::{
        Course, CourseProgress, Difficulty, NewTopic, PdfNote, Quiz, QuizQuestion, TestScore,
        Timetable, Topic, TopicStatus, User, UserCredentials,
    },
    ports::{DatabaseService, PortError, PortResult, TextGenerationService},
    progress::count_completed,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

//=========================================================================================
// Fakes
//=========================================================================================

#[derive(Default)]
struct Store {
    users: Vec<(User, String)>,
    sessions: HashMap<String, Uuid>,
    courses: Vec<Course>,
    quizzes: Vec<Quiz>,
    timetables: HashMap<Uuid, Timetable>,
}

#[derive(Default)]
struct FakeDb {
    store: Mutex<Store>,
    fail_course_fetch: AtomicBool,
}

impl FakeDb {
    fn with_course<T>(&self, course_id: Uuid, f: impl FnOnce(&mut Course) -> T) -> PortResult<T> {
        let mut store = self.store.lock().unwrap();
        store
            .courses
            .iter_mut()
            .find(|c| c.id == course_id)
            .map(f)
            .ok_or_else(|| PortError::NotFound(format!("Course {} not found", course_id)))
    }
}

#[async_trait]
impl DatabaseService for FakeDb {
    async fn create_user(&self, name: &str, email: &str, hashed_password: &str) -> PortResult<User> {
        let mut store = self.store.lock().unwrap();
        if store.users.iter().any(|(u, _)| u.email == email) {
            return Err(PortError::InvalidInput(format!("Email {} is already registered", email)));
        }
        let user = User {
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
        };
        store.users.push((user.clone(), hashed_password.to_string()));
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let store = self.store.lock().unwrap();
        store
            .users
            .iter()
            .find(|(u, _)| u.email == email)
            .map(|(u, hash)| UserCredentials {
                user_id: u.user_id,
                email: u.email.clone(),
                hashed_password: hash.clone(),
            })
            .ok_or_else(|| PortError::NotFound(email.to_string()))
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let store = self.store.lock().unwrap();
        store
            .users
            .iter()
            .find(|(u, _)| u.user_id == user_id)
            .map(|(u, _)| u.clone())
            .ok_or_else(|| PortError::NotFound(user_id.to_string()))
    }

    async fn create_auth_session(&self, session_id: &str, user_id: Uuid, _expires_at: DateTime<Utc>) -> PortResult<()> {
        self.store.lock().unwrap().sessions.insert(session_id.to_string(), user_id);
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        self.store
            .lock()
            .unwrap()
            .sessions
            .get(session_id)
            .copied()
            .ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.store.lock().unwrap().sessions.remove(session_id);
        Ok(())
    }

    async fn create_course(&self, user_id: Uuid, subject: &str, difficulty: Difficulty, topics: &[NewTopic]) -> PortResult<Course> {
        let course = Course {
            id: Uuid::new_v4(),
            user_id,
            subject: subject.to_string(),
            difficulty,
            topics: topics
                .iter()
                .map(|t| Topic {
                    id: Uuid::new_v4(),
                    title: t.title.clone(),
                    content: t.content.clone(),
                    estimated_hours: t.estimated_hours,
                    status: TopicStatus::NotStarted,
                })
                .collect(),
            progress: CourseProgress::default(),
            has_quiz: false,
            has_timetable: false,
            pdf_notes: Vec::new(),
            created_at: Utc::now(),
        };
        self.store.lock().unwrap().courses.push(course.clone());
        Ok(course)
    }

    async fn get_courses_by_user(&self, user_id: Uuid) -> PortResult<Vec<Course>> {
        if self.fail_course_fetch.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("connection refused".to_string()));
        }
        let store = self.store.lock().unwrap();
        Ok(store.courses.iter().filter(|c| c.user_id == user_id).cloned().collect())
    }

    async fn get_course(&self, user_id: Uuid, course_id: Uuid) -> PortResult<Course> {
        let store = self.store.lock().unwrap();
        store
            .courses
            .iter()
            .find(|c| c.id == course_id && c.user_id == user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Course {} not found", course_id)))
    }

    async fn delete_course(&self, user_id: Uuid, course_id: Uuid) -> PortResult<()> {
        let mut store = self.store.lock().unwrap();
        let before = store.courses.len();
        store.courses.retain(|c| !(c.id == course_id && c.user_id == user_id));
        if store.courses.len() == before {
            return Err(PortError::NotFound(format!("Course {} not found", course_id)));
        }
        Ok(())
    }

    async fn update_topic_status(&self, user_id: Uuid, course_id: Uuid, topic_id: Uuid, status: TopicStatus) -> PortResult<Course> {
        self.get_course(user_id, course_id).await?;
        self.with_course(course_id, |course| {
            let topic = course
                .topics
                .iter_mut()
                .find(|t| t.id == topic_id)
                .ok_or_else(|| PortError::NotFound(format!("Topic {} not found", topic_id)))?;
            topic.status = status;
            course.progress.completed_topics = Some(count_completed(&course.topics));
            Ok(course.clone())
        })?
    }

    async fn record_test_score(&self, course_id: Uuid, score: &TestScore) -> PortResult<()> {
        self.with_course(course_id, |c| c.progress.test_scores.push(score.clone()))
    }

    async fn save_quiz(&self, course_id: Uuid, topic: Option<&str>, questions: &[QuizQuestion]) -> PortResult<Quiz> {
        self.with_course(course_id, |c| c.has_quiz = true)?;
        let quiz = Quiz {
            id: Uuid::new_v4(),
            course_id,
            topic: topic.map(str::to_string),
            questions: questions.to_vec(),
            created_at: Utc::now(),
        };
        self.store.lock().unwrap().quizzes.push(quiz.clone());
        Ok(quiz)
    }

    async fn get_latest_quiz(&self, course_id: Uuid) -> PortResult<Quiz> {
        let store = self.store.lock().unwrap();
        store
            .quizzes
            .iter()
            .rev()
            .find(|q| q.course_id == course_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound("no quiz".to_string()))
    }

    async fn save_timetable(&self, course_id: Uuid, plan: &str) -> PortResult<Timetable> {
        self.with_course(course_id, |c| c.has_timetable = true)?;
        let timetable = Timetable {
            id: Uuid::new_v4(),
            course_id,
            plan: plan.to_string(),
            created_at: Utc::now(),
        };
        self.store.lock().unwrap().timetables.insert(course_id, timetable.clone());
        Ok(timetable)
    }

    async fn get_timetable(&self, course_id: Uuid) -> PortResult<Timetable> {
        self.store
            .lock()
            .unwrap()
            .timetables
            .get(&course_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound("no timetable".to_string()))
    }

    async fn save_pdf_note(&self, course_id: Uuid, file_name: &str, notes: &str) -> PortResult<PdfNote> {
        let note = PdfNote {
            id: Uuid::new_v4(),
            course_id,
            file_name: file_name.to_string(),
            notes: notes.to_string(),
            created_at: Utc::now(),
        };
        let stored = note.clone();
        self.with_course(course_id, move |c| c.pdf_notes.push(stored))?;
        Ok(note)
    }

    async fn get_pdf_notes(&self, course_id: Uuid) -> PortResult<Vec<PdfNote>> {
        self.with_course(course_id, |c| c.pdf_notes.clone())
    }
}

/// Answers every prompt with the same reply, or fails when there is none.
struct FakeLlm {
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl FakeLlm {
    fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerationService for FakeLlm {
    async fn generate_text(&self, prompt: &str) -> PortResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply
            .clone()
            .ok_or_else(|| PortError::Unexpected("model quota exceeded".to_string()))
    }
}

//=========================================================================================
// Harness
//=========================================================================================

const SESSION: &str = "test-session";

struct Harness {
    app: Router,
    db: Arc<FakeDb>,
    llm: Arc<FakeLlm>,
    user_id: Uuid,
}

fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "postgres://unused".to_string(),
        log_level: tracing::Level::INFO,
        ai_api_key: None,
        ai_api_base: None,
        ai_model: "test-model".to_string(),
        ai_timeout: Duration::from_secs(5),
        cors_origin: HeaderValue::from_static("http://localhost:5173"),
        session_ttl_hours: 24,
    }
}

fn harness(reply: Option<&str>) -> Harness {
    let db = Arc::new(FakeDb::default());
    let user_id = Uuid::new_v4();
    {
        let mut store = db.store.lock().unwrap();
        store.users.push((
            User {
                user_id,
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
            },
            String::new(),
        ));
        store.sessions.insert(SESSION.to_string(), user_id);
    }
    let llm = Arc::new(FakeLlm {
        reply: reply.map(str::to_string),
        prompts: Mutex::new(Vec::new()),
    });
    let state = Arc::new(AppState {
        db: db.clone(),
        config: Arc::new(test_config()),
        llm: llm.clone(),
    });
    Harness {
        app: build_router(state),
        db,
        llm,
        user_id,
    }
}

/// A course whose first `completed` topics are done.
fn course_fixture(user_id: Uuid, titles: &[&str], completed: usize, scores: Vec<TestScore>) -> Course {
    Course {
        id: Uuid::new_v4(),
        user_id,
        subject: "Mathematics".to_string(),
        difficulty: Difficulty::Beginner,
        topics: titles
            .iter()
            .enumerate()
            .map(|(i, title)| Topic {
                id: Uuid::new_v4(),
                title: title.to_string(),
                content: None,
                estimated_hours: Some(2.0),
                status: if i < completed { TopicStatus::Completed } else { TopicStatus::NotStarted },
            })
            .collect(),
        progress: CourseProgress {
            completed_topics: Some(completed),
            test_scores: scores,
        },
        has_quiz: false,
        has_timetable: false,
        pdf_notes: Vec::new(),
        created_at: Utc::now(),
    }
}

impl Harness {
    fn insert(&self, course: Course) -> Uuid {
        let id = course.id;
        self.db.store.lock().unwrap().courses.push(course);
        id
    }

    async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::COOKIE, format!("session={}", SESSION));
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        send(&self.app, builder.body(body).unwrap()).await
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

fn topics_of(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("Topic {i}")).collect()
}

fn as_refs(v: &[String]) -> Vec<&str> {
    v.iter().map(String::as_str).collect()
}

//=========================================================================================
// Tests
//=========================================================================================

#[tokio::test]
async fn health_is_public() {
    let h = harness(None);
    let req = Request::get("/").body(Body::empty()).unwrap();
    let (status, body) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("AI LMS Backend is live".to_string()));
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let h = harness(None);
    let req = Request::get("/api/dashboard").body(Body::empty()).unwrap();
    assert_eq!(send(&h.app, req).await.0, StatusCode::UNAUTHORIZED);

    let req = Request::get("/api/dashboard")
        .header(header::COOKIE, "session=forged")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&h.app, req).await.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn dashboard_buckets_one_course_each() {
    let h = harness(None);
    let five = topics_of(5);
    let four = topics_of(4);
    let three = topics_of(3);
    h.insert(course_fixture(h.user_id, &as_refs(&five), 5, vec![]));
    h.insert(course_fixture(h.user_id, &as_refs(&four), 2, vec![]));
    h.insert(course_fixture(h.user_id, &as_refs(&three), 0, vec![]));

    let (status, body) = h.request(Method::GET, "/api/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCourses"], 3);
    assert_eq!(body["courseStats"], json!({"completed": 1, "inProgress": 1, "notStarted": 1}));
    assert_eq!(body["quizScores"].as_array().unwrap().len(), 5);
    assert_eq!(body["quizScores"][0], json!({"topic": "Introduction", "score": 85}));
    assert_eq!(body["notice"], Value::Null);
}

#[tokio::test]
async fn dashboard_uses_recorded_scores() {
    let h = harness(None);
    let course_id = h.insert(course_fixture(h.user_id, &["Sets", "Logic"], 1, vec![]));

    let (status, _) = h
        .request(
            Method::POST,
            &format!("/api/quiz/{course_id}/score"),
            Some(json!({"topic": "Sets", "score": 73})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = h.request(Method::GET, "/api/dashboard", None).await;
    assert_eq!(body["quizScores"], json!([{"topic": "Sets", "score": 73}]));
}

#[tokio::test]
async fn dashboard_serves_fallback_when_courses_cannot_load() {
    let h = harness(None);
    h.db.fail_course_fetch.store(true, Ordering::SeqCst);

    let (status, body) = h.request(Method::GET, "/api/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["courseStats"], json!({"completed": 1, "inProgress": 2, "notStarted": 3}));
    assert_eq!(body["totalCourses"], 0);
    assert_eq!(body["quizScores"].as_array().unwrap().len(), 5);
    assert!(body["notice"].as_str().unwrap().contains("Failed to load dashboard data"));
}

#[tokio::test]
async fn chatbot_grounds_the_prompt_in_course_topics() {
    let h = harness(Some("Derivatives measure rates of change."));
    h.insert(course_fixture(h.user_id, &["Algebra", "Calculus"], 0, vec![]));

    let (status, body) = h
        .request(Method::POST, "/api/chatbot/chat", Some(json!({"message": "Explain derivatives"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Derivatives measure rates of change."}));

    let prompt = h.llm.last_prompt();
    let topics = prompt.find("Algebra, Calculus").unwrap();
    let question = prompt.find("Explain derivatives").unwrap();
    assert!(topics < question);
}

#[tokio::test]
async fn chatbot_reports_model_failure() {
    let h = harness(None);
    let (status, body) = h
        .request(Method::POST, "/api/chatbot/chat", Some(json!({"message": "Hi"})))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Chatbot failed to respond");
    assert!(body["error"].as_str().unwrap().contains("model quota exceeded"));
}

#[tokio::test]
async fn create_course_turns_syllabus_into_topics() {
    let h = harness(Some("1. Limits | 2 hours\n2. Derivatives | 3\n3. Integrals"));
    let (status, body) = h
        .request(
            Method::POST,
            "/api/course",
            Some(json!({"subject": "Calculus", "difficulty": "Intermediate"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["subject"], "Calculus");
    assert_eq!(body["difficulty"], "intermediate");
    assert_eq!(body["status"], "not-started");
    assert_eq!(body["progress"]["totalTopics"], 3);
    assert_eq!(body["progress"]["completedTopics"], 0);
    assert_eq!(body["topics"][0]["title"], "Limits");
    assert_eq!(body["topics"][0]["estimatedHours"], 2.0);

    let (_, list) = h.request(Method::GET, "/api/course/my-courses", None).await;
    assert_eq!(list["courses"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn create_course_validates_input_and_model_output() {
    let h = harness(Some("Sorry, I can't help with that:"));
    let (status, _) = h
        .request(Method::POST, "/api/course", Some(json!({"subject": "Chess", "difficulty": "grandmaster"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = h
        .request(Method::POST, "/api/course", Some(json!({"subject": "  ", "difficulty": "beginner"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = h
        .request(Method::POST, "/api/course", Some(json!({"subject": "Chess", "difficulty": "beginner"})))
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn completing_topics_moves_course_through_buckets() {
    let h = harness(None);
    let course = course_fixture(h.user_id, &["Vectors", "Matrices"], 0, vec![]);
    let course_id = course.id;
    let first = course.topics[0].id;
    let second = course.topics[1].id;
    h.insert(course);

    let uri = format!("/api/course/{course_id}/topics/{first}");
    let (status, body) = h.request(Method::PATCH, &uri, Some(json!({"status": "completed"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["progress"]["completedTopics"], 1);
    assert_eq!(body["progress"]["percent"], 50.0);
    assert_eq!(body["status"], "in-progress");

    let uri = format!("/api/course/{course_id}/topics/{second}");
    let (_, body) = h.request(Method::PATCH, &uri, Some(json!({"status": "complete"}))).await;
    assert_eq!(body["status"], "completed");

    let (status, _) = h.request(Method::PATCH, &uri, Some(json!({"status": "finished"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn other_users_courses_are_not_found() {
    let h = harness(None);
    let stranger = course_fixture(Uuid::new_v4(), &["Secrets"], 0, vec![]);
    let course_id = h.insert(stranger);

    let uri = format!("/api/course/{course_id}");
    assert_eq!(h.request(Method::GET, &uri, None).await.0, StatusCode::NOT_FOUND);
    assert_eq!(h.request(Method::DELETE, &uri, None).await.0, StatusCode::NOT_FOUND);
    assert_eq!(h.db.store.lock().unwrap().courses.len(), 1);
}

#[tokio::test]
async fn delete_course_removes_it() {
    let h = harness(None);
    let course_id = h.insert(course_fixture(h.user_id, &["Atoms"], 0, vec![]));

    let (status, body) = h.request(Method::DELETE, &format!("/api/course/{course_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Course deleted successfully");
    assert!(h.db.store.lock().unwrap().courses.is_empty());
}

#[tokio::test]
async fn quiz_generation_marks_the_course() {
    let reply = r#"```json
[{"question": "d/dx x^2?", "options": ["x", "2x", "x^2", "2"], "answer": "2x"}]
```"#;
    let h = harness(Some(reply));
    let course_id = h.insert(course_fixture(h.user_id, &["Derivatives"], 0, vec![]));

    let (status, body) = h
        .request(
            Method::POST,
            &format!("/api/quiz/{course_id}/generate"),
            Some(json!({"topic": "Derivatives"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["topic"], "Derivatives");
    assert_eq!(body["questions"][0]["answer"], "2x");

    let (_, latest) = h.request(Method::GET, &format!("/api/quiz/{course_id}"), None).await;
    assert_eq!(latest["id"], body["id"]);

    let (_, course) = h.request(Method::GET, &format!("/api/course/{course_id}"), None).await;
    assert_eq!(course["hasQuiz"], true);
}

#[tokio::test]
async fn quiz_without_body_covers_whole_course() {
    let reply = r#"[{"question": "Which is a vector space?", "options": ["R^2", "Z"], "answer": "R^2"}]"#;
    let h = harness(Some(reply));
    let course_id = h.insert(course_fixture(h.user_id, &["Vectors", "Matrices"], 0, vec![]));

    let (status, body) = h
        .request(Method::POST, &format!("/api/quiz/{course_id}/generate"), None)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["topic"], Value::Null);
    assert_eq!(body["questions"].as_array().unwrap().len(), 1);

    let prompt = h.llm.last_prompt();
    assert!(prompt.contains("these topics: Vectors, Matrices"));
    assert!(prompt.contains("Write 5 multiple-choice questions"));
}

#[tokio::test]
async fn score_outside_range_is_rejected() {
    let h = harness(None);
    let course_id = h.insert(course_fixture(h.user_id, &["Sets"], 0, vec![]));
    let (status, _) = h
        .request(
            Method::POST,
            &format!("/api/quiz/{course_id}/score"),
            Some(json!({"topic": "Sets", "score": 140})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn timetable_is_generated_and_stored() {
    let h = harness(Some("Day 1: Limits (2h)\nDay 2: Derivatives (2h)"));
    let course_id = h.insert(course_fixture(h.user_id, &["Limits", "Derivatives"], 0, vec![]));
    let uri = format!("/api/timetable/{course_id}");

    let (status, _) = h.request(Method::POST, &uri, Some(json!({"hours_per_day": 0, "days": 3}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = h.request(Method::POST, &uri, Some(json!({"hours_per_day": 2, "days": 2}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["plan"].as_str().unwrap().starts_with("Day 1"));
    assert!(h.llm.last_prompt().contains("- Limits (2 hours)"));

    let (status, stored) = h.request(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["plan"], body["plan"]);
}

#[tokio::test]
async fn uploaded_document_becomes_notes() {
    let h = harness(Some("# Newton's laws\n- Inertia"));
    let course_id = h.insert(course_fixture(h.user_id, &["Mechanics"], 0, vec![]));

    let boundary = "lmsboundary";
    let multipart = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"chapter1.txt\"\r\n\
         Content-Type: text/plain\r\n\r\n\
         An object at rest stays at rest.\r\n\
         --{boundary}--\r\n"
    );
    let req = Request::post(format!("/api/pdf/{course_id}/notes"))
        .header(header::COOKIE, format!("session={}", SESSION))
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(multipart))
        .unwrap();
    let (status, body) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["fileName"], "chapter1.txt");
    assert!(h.llm.last_prompt().contains("An object at rest stays at rest."));

    let (_, list) = h.request(Method::GET, &format!("/api/pdf/{course_id}/notes"), None).await;
    assert_eq!(list["notes"].as_array().unwrap().len(), 1);

    let (_, course) = h.request(Method::GET, &format!("/api/course/{course_id}"), None).await;
    assert_eq!(course["hasPdfNotes"], true);
}

#[tokio::test]
async fn signup_then_profile_then_logout() {
    let h = harness(None);
    let req = Request::post("/api/auth/signup")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"name": "Grace", "email": "Grace@Example.com", "password": "hopper1906"}).to_string(),
        ))
        .unwrap();
    let response = h.app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    let session = cookie.split(';').next().unwrap().to_string();

    let req = Request::get("/api/auth/me")
        .header(header::COOKIE, session.clone())
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Grace");
    assert_eq!(body["email"], "grace@example.com");

    let req = Request::post("/api/auth/logout")
        .header(header::COOKIE, session.clone())
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&h.app, req).await.0, StatusCode::OK);

    let req = Request::get("/api/auth/me")
        .header(header::COOKIE, session)
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&h.app, req).await.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_rejects_wrong_password_and_duplicate_signup_conflicts() {
    let h = harness(None);
    let signup = json!({"name": "Alan", "email": "alan@example.com", "password": "enigma-1912"});
    let post = |uri: &str, body: &Value| {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    };

    assert_eq!(send(&h.app, post("/api/auth/signup", &signup)).await.0, StatusCode::CREATED);
    assert_eq!(send(&h.app, post("/api/auth/signup", &signup)).await.0, StatusCode::CONFLICT);

    let wrong = json!({"email": "alan@example.com", "password": "bombe"});
    assert_eq!(send(&h.app, post("/api/auth/login", &wrong)).await.0, StatusCode::UNAUTHORIZED);

    let right = json!({"email": "alan@example.com", "password": "enigma-1912"});
    assert_eq!(send(&h.app, post("/api/auth/login", &right)).await.0, StatusCode::OK);
}
