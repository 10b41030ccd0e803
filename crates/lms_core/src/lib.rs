pub mod classify;
pub mod dashboard;
pub mod domain;
pub mod parse;
pub mod ports;
pub mod progress;
pub mod prompt;

pub use classify::{classify, classify_course, CourseStatus};
pub use dashboard::{resolve_dashboard, summarize, CourseStats, DashboardSummary, DashboardView};
pub use domain::{
    Course, CourseProgress, Difficulty, NewTopic, PdfNote, Quiz, QuizQuestion, TestScore,
    Timetable, Topic, TopicStatus, User, UserCredentials,
};
pub use ports::{DatabaseService, PortError, PortResult, TextGenerationService};
pub use progress::{aggregate, ProgressSummary};
