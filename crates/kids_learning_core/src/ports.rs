//! crates/kids_learning_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! The HTTP backend implements the catalog and story ports; the app implements
//! state storage. The core never touches I/O directly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Activity, AgeGroup, Course, NewActivity, NewCourse, NewReview, TeacherProfile,
};
use crate::status::EntityKind;
use crate::store::Record;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid status '{status}' for {kind}. Allowed: {allowed}")]
    InvalidStatus {
        kind: EntityKind,
        status: String,
        allowed: String,
    },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Network failure: {0}")]
    Network(String),
    #[error("Service unavailable: {0}")]
    Unavailable(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    // --- Reads (whole collections, no paging) ---
    async fn list_teachers(&self) -> PortResult<Vec<TeacherProfile>>;

    async fn list_courses(&self) -> PortResult<Vec<Course>>;

    async fn list_activities(&self) -> PortResult<Vec<Activity>>;

    // --- Status workflow ---
    /// Validates `new_status` against the kind's allowed set, then patches the
    /// record. Nothing is mutated when either check fails.
    async fn patch_status(&self, kind: EntityKind, id: &str, new_status: &str)
        -> PortResult<Record>;

    /// Puts a teacher back into review (`Pending`).
    async fn submit_verification(&self, teacher_id: &str) -> PortResult<TeacherProfile>;

    // --- Submissions ---
    async fn create_course(&self, draft: NewCourse) -> PortResult<Course>;

    async fn create_activity(&self, draft: NewActivity) -> PortResult<Activity>;

    async fn add_review(&self, teacher_id: &str, review: NewReview) -> PortResult<TeacherProfile>;
}

/// A short story produced for a kid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GeneratedStory {
    pub title: String,
    pub text: String,
}

#[async_trait]
pub trait StoryGenerationService: Send + Sync {
    /// Writes an age-appropriate story from a kid's prompt.
    async fn generate_story(&self, prompt: &str, age_group: AgeGroup) -> PortResult<GeneratedStory>;

    /// Answers a kid's question, optionally grounded in some context text.
    async fn answer_question(&self, question: &str, context: Option<&str>) -> PortResult<String>;
}

/// Synchronous key/value storage for the app's persisted session.
pub trait StateStorage: Send + Sync {
    fn get(&self, key: &str) -> PortResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> PortResult<()>;

    fn remove(&self, key: &str) -> PortResult<()>;
}
