//! crates/lms_core/src/prompt.rs
//!
//! Builds the text payloads sent to the generative-AI service. Every function
//! here is deterministic: the same input always renders the same prompt.

use crate::domain::{Course, Difficulty};

/// Upper bound on topics requested for a new course.
pub const MAX_TOPICS: usize = 12;

/// Uploaded documents are cut to this many characters before summarising.
pub const MAX_NOTES_INPUT_CHARS: usize = 12_000;

/// All topic titles across the given courses, course order then topic order.
pub fn join_topic_titles(courses: &[Course]) -> String {
    courses
        .iter()
        .flat_map(|course| course.topics.iter().map(|t| t.title.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// The chatbot prompt: tutor instruction, the topics being studied, the
/// answering instruction, then the question verbatim.
pub fn compose_chat_prompt(topics: &str, question: &str) -> String {
    format!(
        "You are a helpful AI tutor. The user is currently studying the following topics: {topics}.\n\
         Answer their question in a friendly and educational way.\n\
         \n\
         User question: {question}"
    )
}

pub fn compose_topics_prompt(subject: &str, difficulty: Difficulty) -> String {
    format!(
        "You are an expert curriculum designer. Create a syllabus for a {difficulty} level course on \"{subject}\".\n\
         List between 5 and {MAX_TOPICS} topics in the order they should be studied.\n\
         Write exactly one topic per line in the form: Topic title | estimated hours\n\
         Do not number the lines and do not add any other text."
    )
}

/// Asks for a multiple-choice quiz as a JSON array, scoped to one topic when given.
pub fn compose_quiz_prompt(course: &Course, topic: Option<&str>, questions: usize) -> String {
    let scope = match topic {
        Some(topic) => format!("the topic \"{topic}\""),
        None => format!("these topics: {}", join_topic_titles(std::slice::from_ref(course))),
    };
    format!(
        "You are an instructor writing a {difficulty} level quiz for a course on \"{subject}\".\n\
         Write {questions} multiple-choice questions covering {scope}.\n\
         Respond with ONLY a JSON array. Each element must be an object with the keys \
         \"question\" (string), \"options\" (array of 4 strings) and \"answer\" (the exact text of the correct option).",
        difficulty = course.difficulty,
        subject = course.subject,
    )
}

pub fn compose_timetable_prompt(course: &Course, hours_per_day: f32, days: u32) -> String {
    let topics = course
        .topics
        .iter()
        .map(|t| match t.estimated_hours {
            Some(hours) => format!("- {} ({hours} hours)", t.title),
            None => format!("- {}", t.title),
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "You are a study planner. Build a day-by-day study timetable for a {difficulty} level course on \"{subject}\".\n\
         The learner has {days} days and can study {hours_per_day} hours per day.\n\
         Topics to cover, in order:\n\
         {topics}\n\
         \n\
         For each day, list the topics and the hours to spend on each. Keep it concise.",
        difficulty = course.difficulty,
        subject = course.subject,
    )
}

pub fn compose_notes_prompt(subject: &str, document_text: &str) -> String {
    let excerpt: String = document_text.chars().take(MAX_NOTES_INPUT_CHARS).collect();
    format!(
        "You are a study assistant for a course on \"{subject}\".\n\
         Turn the following document into clear, well-structured study notes with headings and bullet points.\n\
         Highlight key definitions and finish with a short summary.\n\
         \n\
         DOCUMENT:\n\
         ---\n\
         {excerpt}\n\
         ---"
    )
}
