//! services/api/src/adapters/catalog.rs
//!
//! The in-memory catalog adapter: the concrete implementation of the
//! `CatalogRepository` port from the `core` crate. A single `RecordStore`
//! behind an async lock, seeded at process start.

use async_trait::async_trait;
use kids_learning_core::domain::{
    Activity, Course, NewActivity, NewCourse, NewReview, TeacherProfile,
};
use kids_learning_core::ports::{CatalogRepository, PortResult};
use kids_learning_core::status::EntityKind;
use kids_learning_core::store::{Record, RecordStore};
use tokio::sync::RwLock;
use tracing::info;

use crate::adapters::seed;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A catalog adapter that keeps every record in process memory.
///
/// Each mutation holds the write lock for the whole read-modify-replace, so a
/// caller never observes a half-applied patch.
pub struct MemoryCatalog {
    store: RwLock<RecordStore>,
}

impl MemoryCatalog {
    pub fn new(store: RecordStore) -> Self {
        Self {
            store: RwLock::new(store),
        }
    }

    /// A catalog holding the demo seed content.
    pub fn seeded() -> Self {
        let store = seed::seed_store();
        info!(
            "Seeded catalog with {} teachers, {} courses, {} activities",
            store.teachers().len(),
            store.courses().len(),
            store.activities().len()
        );
        Self::new(store)
    }
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new(RecordStore::default())
    }
}

//=========================================================================================
// `CatalogRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl CatalogRepository for MemoryCatalog {
    async fn list_teachers(&self) -> PortResult<Vec<TeacherProfile>> {
        Ok(self.store.read().await.teachers().to_vec())
    }

    async fn list_courses(&self) -> PortResult<Vec<Course>> {
        Ok(self.store.read().await.courses().to_vec())
    }

    async fn list_activities(&self) -> PortResult<Vec<Activity>> {
        Ok(self.store.read().await.activities().to_vec())
    }

    async fn patch_status(
        &self,
        kind: EntityKind,
        id: &str,
        new_status: &str,
    ) -> PortResult<Record> {
        let record = self.store.write().await.patch_status(kind, id, new_status)?;
        info!("Patched {} {} to status {}", kind, id, new_status);
        Ok(record)
    }

    async fn submit_verification(&self, teacher_id: &str) -> PortResult<TeacherProfile> {
        self.store.write().await.submit_verification(teacher_id)
    }

    async fn create_course(&self, draft: NewCourse) -> PortResult<Course> {
        let course = self.store.write().await.insert_course(draft)?;
        info!("Course {} submitted by teacher {}", course.id, course.teacher_id);
        Ok(course)
    }

    async fn create_activity(&self, draft: NewActivity) -> PortResult<Activity> {
        let activity = self.store.write().await.insert_activity(draft)?;
        info!("Activity {} submitted for review", activity.id);
        Ok(activity)
    }

    async fn add_review(&self, teacher_id: &str, review: NewReview) -> PortResult<TeacherProfile> {
        self.store.write().await.add_review(teacher_id, review)
    }
}
