//! crates/lms_core/src/parse.rs
//!
//! Turns free-form model replies into domain values.

use crate::domain::{NewTopic, QuizQuestion};
use crate::ports::{PortError, PortResult};
use crate::prompt::MAX_TOPICS;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

// Bullets, "1." / "1)" numbering, and markdown emphasis at the start of a line.
static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*•]|\d+[.)])\s*").expect("list marker pattern"));

/// Parses a syllabus written one topic per line as `Title | hours`.
/// Blank lines and section headings (lines ending in `:`) are skipped.
pub fn parse_topic_lines(text: &str) -> Vec<NewTopic> {
    text.lines()
        .filter_map(|line| {
            let line = LIST_MARKER.replace(line, "");
            let line = line.trim().trim_matches('*').trim();
            if line.is_empty() || line.ends_with(':') || line.starts_with("```") {
                return None;
            }

            let (title, hours) = match line.split_once('|') {
                Some((title, hours)) => (title.trim(), parse_hours(hours)),
                None => (line, None),
            };
            if title.is_empty() {
                return None;
            }

            Some(NewTopic {
                title: title.to_string(),
                content: None,
                estimated_hours: hours,
            })
        })
        .take(MAX_TOPICS)
        .collect()
}

fn parse_hours(raw: &str) -> Option<f32> {
    let number = raw
        .trim()
        .trim_end_matches(|c: char| c.is_alphabetic() || c.is_whitespace());
    number.parse::<f32>().ok().filter(|h| h.is_finite() && *h > 0.0)
}

#[derive(Deserialize)]
struct RawQuestion {
    question: String,
    #[serde(default)]
    options: Vec<String>,
    answer: String,
}

/// Extracts the question array from a quiz reply. Fenced code blocks are tried
/// before the rest of the reply, and brackets in surrounding prose are skipped.
/// Questions whose answer is not one of their options are dropped.
pub fn parse_quiz(text: &str) -> PortResult<Vec<QuizQuestion>> {
    let raw = fenced_bodies(text)
        .chain(std::iter::once(text))
        .find_map(first_question_array)
        .ok_or_else(|| {
            PortError::Unexpected("Quiz response did not contain a JSON array of questions.".to_string())
        })?;

    let questions: Vec<QuizQuestion> = raw
        .into_iter()
        .filter_map(|q| {
            let options: Vec<String> = q.options.into_iter().map(|o| o.trim().to_string()).collect();
            let answer = q.answer.trim().to_string();
            if q.question.trim().is_empty() || !options.contains(&answer) {
                return None;
            }
            Some(QuizQuestion {
                question: q.question.trim().to_string(),
                options,
                answer,
            })
        })
        .collect();

    if questions.is_empty() {
        return Err(PortError::Unexpected(
            "Quiz response contained no usable questions.".to_string(),
        ));
    }
    Ok(questions)
}

fn fenced_bodies(text: &str) -> impl Iterator<Item = &str> {
    text.split("```").skip(1).step_by(2)
}

// Tries every `[` in turn; the first non-empty array of questions wins and
// anything after it is ignored.
fn first_question_array(text: &str) -> Option<Vec<RawQuestion>> {
    text.match_indices('[').find_map(|(at, _)| {
        serde_json::Deserializer::from_str(&text[at..])
            .into_iter::<Vec<RawQuestion>>()
            .next()?
            .ok()
            .filter(|questions| !questions.is_empty())
    })
}
