//! services/api/src/web/state.rs
//!
//! Defines the backend's shared state, created once at startup and handed to
//! every handler.

use crate::config::Config;
use kids_learning_core::ports::{CatalogRepository, StoryGenerationService};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogRepository>,
    pub config: Arc<Config>,
    /// `None` when no model API key is configured; the AI endpoints then answer 503.
    pub story_adapter: Option<Arc<dyn StoryGenerationService>>,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        config: Arc<Config>,
        story_adapter: Option<Arc<dyn StoryGenerationService>>,
    ) -> Self {
        Self {
            catalog,
            config,
            story_adapter,
        }
    }
}
