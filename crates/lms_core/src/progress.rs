//! crates/lms_core/src/progress.rs
//!
//! Rolls a course's topics up into completion counts.

use crate::domain::{Course, Topic, TopicStatus};

/// Completion counts for one course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressSummary {
    pub completed_topics: usize,
    pub total_topics: usize,
}

impl ProgressSummary {
    pub fn new(completed_topics: usize, total_topics: usize) -> Self {
        Self {
            completed_topics: completed_topics.min(total_topics),
            total_topics,
        }
    }

    /// Fraction of topics completed, `0.0` for a course without topics.
    pub fn ratio(&self) -> f64 {
        if self.total_topics == 0 {
            return 0.0;
        }
        self.completed_topics as f64 / self.total_topics as f64
    }

    pub fn percent(&self) -> f64 {
        self.ratio() * 100.0
    }
}

/// Aggregates a course. Never mutates it.
pub fn aggregate(course: &Course) -> ProgressSummary {
    aggregate_topics(&course.topics, course.progress.completed_topics)
}

/// The stored count wins when present; otherwise completed topics are counted.
/// Either way the result is capped at the number of topics.
pub fn aggregate_topics(topics: &[Topic], stored_completed: Option<usize>) -> ProgressSummary {
    let completed = stored_completed.unwrap_or_else(|| count_completed(topics));
    ProgressSummary::new(completed, topics.len())
}

pub fn count_completed(topics: &[Topic]) -> usize {
    topics
        .iter()
        .filter(|t| t.status == TopicStatus::Completed)
        .count()
}
