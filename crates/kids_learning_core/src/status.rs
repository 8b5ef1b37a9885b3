//! crates/kids_learning_core/src/status.rs
//!
//! Status validation for the three catalog kinds. This is a set-membership
//! check: any allowed value may be set from any current value.

use serde::{Deserialize, Serialize};

use crate::domain::{ActivityStatus, CourseStatus, VerificationStatus};
use crate::ports::{PortError, PortResult};

/// The catalog collections a status patch can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Teacher,
    Course,
    Activity,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Teacher => write!(f, "teacher"),
            EntityKind::Course => write!(f, "course"),
            EntityKind::Activity => write!(f, "activity"),
        }
    }
}

impl EntityKind {
    /// The only values a status patch may write for this kind.
    pub fn allowed_statuses(self) -> &'static [&'static str] {
        match self {
            EntityKind::Teacher => &["Pending", "Verified", "Rejected"],
            EntityKind::Course => &["Pending", "Active", "Rejected"],
            EntityKind::Activity => &["Pending", "Approved", "Rejected"],
        }
    }
}

/// A status value that passed validation for its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    Teacher(VerificationStatus),
    Course(CourseStatus),
    Activity(ActivityStatus),
}

/// Checks `raw` against the kind's allowed set. Matching is exact.
pub fn validate_status(kind: EntityKind, raw: &str) -> PortResult<StatusChange> {
    let change = match (kind, raw) {
        (EntityKind::Teacher, "Pending") => StatusChange::Teacher(VerificationStatus::Pending),
        (EntityKind::Teacher, "Verified") => StatusChange::Teacher(VerificationStatus::Verified),
        (EntityKind::Teacher, "Rejected") => StatusChange::Teacher(VerificationStatus::Rejected),
        (EntityKind::Course, "Pending") => StatusChange::Course(CourseStatus::Pending),
        (EntityKind::Course, "Active") => StatusChange::Course(CourseStatus::Active),
        (EntityKind::Course, "Rejected") => StatusChange::Course(CourseStatus::Rejected),
        (EntityKind::Activity, "Pending") => StatusChange::Activity(ActivityStatus::Pending),
        (EntityKind::Activity, "Approved") => StatusChange::Activity(ActivityStatus::Approved),
        (EntityKind::Activity, "Rejected") => StatusChange::Activity(ActivityStatus::Rejected),
        _ => {
            return Err(PortError::InvalidStatus {
                kind,
                status: raw.to_string(),
                allowed: kind.allowed_statuses().join(", "),
            })
        }
    };
    Ok(change)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_every_allowed_value() {
        for kind in [EntityKind::Teacher, EntityKind::Course, EntityKind::Activity] {
            for status in kind.allowed_statuses() {
                assert!(validate_status(kind, status).is_ok(), "{} {}", kind, status);
            }
        }
    }

    #[test]
    fn rejects_values_from_other_kinds() {
        assert!(validate_status(EntityKind::Teacher, "Active").is_err());
        assert!(validate_status(EntityKind::Course, "Approved").is_err());
        assert!(validate_status(EntityKind::Activity, "Verified").is_err());
    }

    #[test]
    fn course_draft_and_completed_are_not_patchable() {
        for status in ["Draft", "Completed", "Deleted", "active"] {
            let err = validate_status(EntityKind::Course, status).unwrap_err();
            assert!(matches!(err, PortError::InvalidStatus { .. }));
        }
    }

    #[test]
    fn not_submitted_cannot_be_set_on_teachers() {
        assert!(validate_status(EntityKind::Teacher, "NotSubmitted").is_err());
    }
}
