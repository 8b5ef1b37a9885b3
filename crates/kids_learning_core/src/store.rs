//! crates/kids_learning_core/src/store.rs
//!
//! The in-memory record store behind the catalog. Three small collections,
//! linear lookup by id, and whole-record replacement on every mutation.

use chrono::Utc;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{
    Activity, ActivityStatus, Course, CourseStatus, NewActivity, NewCourse, NewReview, Review,
    TeacherProfile, VerificationStatus,
};
use crate::ports::{PortError, PortResult};
use crate::status::{validate_status, EntityKind, StatusChange};

/// One record from any of the three collections.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Teacher(TeacherProfile),
    Course(Course),
    Activity(Activity),
}

impl Record {
    pub fn id(&self) -> &str {
        match self {
            Record::Teacher(t) => &t.id,
            Record::Course(c) => &c.id,
            Record::Activity(a) => &a.id,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Record::Teacher(_) => EntityKind::Teacher,
            Record::Course(_) => EntityKind::Course,
            Record::Activity(_) => EntityKind::Activity,
        }
    }

    pub fn into_teacher(self) -> PortResult<TeacherProfile> {
        match self {
            Record::Teacher(t) => Ok(t),
            other => Err(mismatch(EntityKind::Teacher, &other)),
        }
    }

    pub fn into_course(self) -> PortResult<Course> {
        match self {
            Record::Course(c) => Ok(c),
            other => Err(mismatch(EntityKind::Course, &other)),
        }
    }

    pub fn into_activity(self) -> PortResult<Activity> {
        match self {
            Record::Activity(a) => Ok(a),
            other => Err(mismatch(EntityKind::Activity, &other)),
        }
    }
}

fn mismatch(expected: EntityKind, got: &Record) -> PortError {
    PortError::Unexpected(format!("expected a {} record, got a {}", expected, got.kind()))
}

fn not_found(kind: EntityKind, id: &str) -> PortError {
    PortError::NotFound(format!("No {} found with id '{}'", kind, id))
}

/// Holds the teacher, course, and activity collections.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    teachers: Vec<TeacherProfile>,
    courses: Vec<Course>,
    activities: Vec<Activity>,
}

impl RecordStore {
    pub fn new(
        teachers: Vec<TeacherProfile>,
        courses: Vec<Course>,
        activities: Vec<Activity>,
    ) -> Self {
        Self {
            teachers,
            courses,
            activities,
        }
    }

    pub fn teachers(&self) -> &[TeacherProfile] {
        &self.teachers
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    /// Every record of `kind`, in insertion order.
    pub fn list(&self, kind: EntityKind) -> Vec<Record> {
        match kind {
            EntityKind::Teacher => self.teachers.iter().cloned().map(Record::Teacher).collect(),
            EntityKind::Course => self.courses.iter().cloned().map(Record::Course).collect(),
            EntityKind::Activity => self
                .activities
                .iter()
                .cloned()
                .map(Record::Activity)
                .collect(),
        }
    }

    /// Replaces the record with the same kind and id, or appends it.
    pub fn upsert(&mut self, record: Record) {
        fn put<T>(items: &mut Vec<T>, item: T, same: impl Fn(&T) -> bool) {
            match items.iter().position(same) {
                Some(index) => items[index] = item,
                None => items.push(item),
            }
        }
        match record {
            Record::Teacher(t) => {
                let id = t.id.clone();
                put(&mut self.teachers, t, |x| x.id == id)
            }
            Record::Course(c) => {
                let id = c.id.clone();
                put(&mut self.courses, c, |x| x.id == id)
            }
            Record::Activity(a) => {
                let id = a.id.clone();
                put(&mut self.activities, a, |x| x.id == id)
            }
        }
    }

    /// Validates `raw_status` for `kind`, then replaces the matching record
    /// with a copy carrying the new status.
    pub fn patch_status(
        &mut self,
        kind: EntityKind,
        id: &str,
        raw_status: &str,
    ) -> PortResult<Record> {
        let change = validate_status(kind, raw_status)?;
        match change {
            StatusChange::Teacher(status) => {
                self.set_teacher_status(id, status).map(Record::Teacher)
            }
            StatusChange::Course(status) => self.set_course_status(id, status).map(Record::Course),
            StatusChange::Activity(status) => {
                self.set_activity_status(id, status).map(Record::Activity)
            }
        }
    }

    pub fn set_teacher_status(
        &mut self,
        id: &str,
        status: VerificationStatus,
    ) -> PortResult<TeacherProfile> {
        let index = self
            .teachers
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| not_found(EntityKind::Teacher, id))?;
        let mut updated = self.teachers[index].clone();
        updated.set_verification_status(status);
        self.teachers[index] = updated.clone();
        debug!("Teacher {} verification set to {:?}", id, status);
        Ok(updated)
    }

    pub fn set_course_status(&mut self, id: &str, status: CourseStatus) -> PortResult<Course> {
        let index = self
            .courses
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| not_found(EntityKind::Course, id))?;
        let mut updated = self.courses[index].clone();
        updated.status = status;
        self.courses[index] = updated.clone();
        debug!("Course {} status set to {:?}", id, status);
        Ok(updated)
    }

    pub fn set_activity_status(
        &mut self,
        id: &str,
        status: ActivityStatus,
    ) -> PortResult<Activity> {
        let index = self
            .activities
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| not_found(EntityKind::Activity, id))?;
        let mut updated = self.activities[index].clone();
        updated.status = status;
        self.activities[index] = updated.clone();
        debug!("Activity {} status set to {:?}", id, status);
        Ok(updated)
    }

    /// A verification submission is a request for review, so it always lands
    /// on `Pending`.
    pub fn submit_verification(&mut self, teacher_id: &str) -> PortResult<TeacherProfile> {
        self.set_teacher_status(teacher_id, VerificationStatus::Pending)
    }

    pub fn insert_course(&mut self, draft: NewCourse) -> PortResult<Course> {
        if draft.title.trim().is_empty() {
            return Err(PortError::InvalidInput("Course title must not be empty".to_string()));
        }
        if draft.price_one_time.into_iter().chain(draft.price_monthly).any(|p| p < 0.0) {
            return Err(PortError::InvalidInput("Course prices must not be negative".to_string()));
        }
        let course = Course {
            id: fresh_id("course"),
            teacher_id: draft.teacher_id,
            title: draft.title,
            description: draft.description,
            category: draft.category,
            age_groups: draft.age_groups,
            lessons: draft.lessons,
            price_one_time: draft.price_one_time,
            price_monthly: draft.price_monthly,
            status: CourseStatus::Pending,
        };
        self.courses.push(course.clone());
        Ok(course)
    }

    pub fn insert_activity(&mut self, draft: NewActivity) -> PortResult<Activity> {
        if draft.title.trim().is_empty() {
            return Err(PortError::InvalidInput("Activity title must not be empty".to_string()));
        }
        let activity = Activity {
            id: fresh_id("activity"),
            title: draft.title,
            description: draft.description,
            category: draft.category,
            status: ActivityStatus::Pending,
            age_groups: draft.age_groups,
            points: draft.points,
            created_by: draft.created_by,
            content: draft.content,
        };
        self.activities.push(activity.clone());
        Ok(activity)
    }

    /// Appends an immutable review to a teacher. Ratings must be 1 to 5.
    pub fn add_review(
        &mut self,
        teacher_id: &str,
        review: NewReview,
    ) -> PortResult<TeacherProfile> {
        if !(1..=5).contains(&review.rating) {
            return Err(PortError::InvalidInput(format!(
                "Rating must be between 1 and 5, got {}",
                review.rating
            )));
        }
        let index = self
            .teachers
            .iter()
            .position(|t| t.id == teacher_id)
            .ok_or_else(|| not_found(EntityKind::Teacher, teacher_id))?;
        let mut updated = self.teachers[index].clone();
        updated.add_review(Review {
            id: fresh_id("review"),
            teacher_id: teacher_id.to_string(),
            parent_id: review.parent_id,
            parent_name: review.parent_name,
            course_id: review.course_id,
            rating: review.rating,
            comment: review.comment,
            created_at: Utc::now(),
        });
        self.teachers[index] = updated.clone();
        Ok(updated)
    }
}

fn fresh_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}
