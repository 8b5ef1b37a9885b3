//! services/api/src/lib.rs
//!
//! The backend of the kids learning platform: catalog endpoints over an
//! in-memory record store, plus the story passthrough.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;

use std::sync::Arc;

use adapters::MemoryCatalog;
use config::Config;
use web::AppState;

/// Shared state backed by the seeded in-memory catalog and no story model.
/// Used by tests and by clients that embed the backend in-process.
pub fn seeded_state(config: Config) -> Arc<AppState> {
    Arc::new(AppState::new(
        Arc::new(MemoryCatalog::seeded()),
        Arc::new(config),
        None,
    ))
}
