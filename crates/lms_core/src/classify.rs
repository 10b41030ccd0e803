//! crates/lms_core/src/classify.rs
//!
//! Buckets aggregated progress into a display label.

use crate::domain::Course;
use crate::progress::{aggregate, ProgressSummary};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CourseStatus {
    Completed,
    InProgress,
    NotStarted,
}

impl CourseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseStatus::Completed => "completed",
            CourseStatus::InProgress => "in-progress",
            CourseStatus::NotStarted => "not-started",
        }
    }
}

impl fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First matching rule wins. The empty-course rule must run before the
/// equality check, otherwise `0 == 0` would read as completed.
pub fn classify(summary: ProgressSummary) -> CourseStatus {
    if summary.total_topics == 0 {
        CourseStatus::NotStarted
    } else if summary.completed_topics == summary.total_topics {
        CourseStatus::Completed
    } else if summary.completed_topics > 0 {
        CourseStatus::InProgress
    } else {
        CourseStatus::NotStarted
    }
}

pub fn classify_course(course: &Course) -> CourseStatus {
    classify(aggregate(course))
}
