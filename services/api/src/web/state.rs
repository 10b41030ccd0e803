//! services/api/src/web/state.rs
//!
//! Defines the application state shared by every request handler.

use crate::config::Config;
use lms_core::ports::{DatabaseService, TextGenerationService};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub llm: Arc<dyn TextGenerationService>,
}
