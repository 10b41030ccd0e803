//! crates/lms_core/src/dashboard.rs
//!
//! Folds a user's courses into the statistics shown on the dashboard, and
//! supplies the placeholder data used when there is nothing (or nothing
//! reachable) to show.

use crate::classify::{classify_course, CourseStatus};
use crate::domain::{Course, TestScore};
use crate::ports::PortResult;

/// Placeholder chart data, shown whenever no real scores are available.
pub const FALLBACK_QUIZ_SCORES: [(&str, u32); 5] = [
    ("Introduction", 85),
    ("Basic Concepts", 92),
    ("Advanced Topics", 78),
    ("Practical Applications", 88),
    ("Case Studies", 95),
];

/// Shown to the user when the course fetch fails and placeholder data is served.
pub const DASHBOARD_FETCH_NOTICE: &str = "Failed to load dashboard data. Please try again.";

/// Number of courses in each progress bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CourseStats {
    pub completed: usize,
    pub in_progress: usize,
    pub not_started: usize,
}

impl CourseStats {
    pub fn record(&mut self, status: CourseStatus) {
        match status {
            CourseStatus::Completed => self.completed += 1,
            CourseStatus::InProgress => self.in_progress += 1,
            CourseStatus::NotStarted => self.not_started += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    pub course_stats: CourseStats,
    pub quiz_scores: Vec<TestScore>,
    pub total_courses: usize,
}

impl DashboardSummary {
    /// The summary served when the courses could not be fetched at all.
    pub fn fallback() -> Self {
        Self {
            course_stats: CourseStats {
                completed: 1,
                in_progress: 2,
                not_started: 3,
            },
            quiz_scores: fallback_quiz_scores(),
            total_courses: 0,
        }
    }
}

/// What the presentation layer renders: a summary, plus a notice when it is placeholder data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub summary: DashboardSummary,
    pub notice: Option<String>,
}

pub fn fallback_quiz_scores() -> Vec<TestScore> {
    FALLBACK_QUIZ_SCORES
        .iter()
        .map(|(topic, score)| TestScore::new(*topic, *score))
        .collect()
}

pub fn summarize(courses: &[Course]) -> DashboardSummary {
    let mut course_stats = CourseStats::default();
    for course in courses {
        course_stats.record(classify_course(course));
    }

    let mut quiz_scores: Vec<TestScore> = courses
        .iter()
        .flat_map(|course| course.progress.test_scores.iter().cloned())
        .collect();

    // An empty but successful fetch is treated like a failed one for chart data.
    if quiz_scores.is_empty() {
        quiz_scores = fallback_quiz_scores();
    }

    DashboardSummary {
        course_stats,
        quiz_scores,
        total_courses: courses.len(),
    }
}

/// Turns the outcome of the course fetch into something that can always be rendered.
/// A failed fetch is not retried.
pub fn resolve_dashboard(courses: PortResult<Vec<Course>>) -> DashboardView {
    match courses {
        Ok(courses) => DashboardView {
            summary: summarize(&courses),
            notice: None,
        },
        Err(_) => DashboardView {
            summary: DashboardSummary::fallback(),
            notice: Some(DASHBOARD_FETCH_NOTICE.to_string()),
        },
    }
}
