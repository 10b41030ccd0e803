pub mod auth;
pub mod chatbot;
pub mod course;
pub mod dashboard;
pub mod middleware;
pub mod notes;
pub mod quiz;
pub mod rest;
pub mod router;
pub mod state;
pub mod timetable;

// Re-export the router builder so the binary and the tests share one application.
pub use middleware::require_auth;
pub use router::build_router;
