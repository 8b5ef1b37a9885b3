//! crates/kids_learning_core/src/session.rs
//!
//! The client's persisted session: who is logged in as what, the client-local
//! profiles, parental controls, and chat history. The whole struct is written
//! to local storage as one JSON blob after every change.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    Activity, AdminProfile, Badge, ChatConversation, ChatMessage, Course, KidProfile,
    ParentProfile, ParentalControls, Role,
};
use crate::ports::{PortError, PortResult};

/// Storage key for the session blob. Bumping the suffix orphans older blobs;
/// there is no migration between versions.
pub const STATE_STORAGE_KEY: &str = "kids-learning-app-state-v1";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSession {
    pub role: Option<Role>,
    pub active_kid_id: Option<String>,
    pub active_parent_id: Option<String>,
    pub active_teacher_id: Option<String>,
    pub active_admin_id: Option<String>,
    pub parent_profiles: Vec<ParentProfile>,
    pub admin_profiles: Vec<AdminProfile>,
    pub kid_profiles: Vec<KidProfile>,
    /// Keyed by kid id.
    pub parental_controls: BTreeMap<String, ParentalControls>,
    pub chat_conversations: Vec<ChatConversation>,
    pub chat_messages: Vec<ChatMessage>,
}

/// A state fix the routing guard asks for when a stored id no longer resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCorrection {
    /// Drop the kid id and continue as the parent.
    DemoteToParent,
    /// Forget the role and every active id.
    ClearRole,
    ClearParentProfile,
    ClearTeacherProfile,
    ClearAdminProfile,
}

/// Progress derived on the client from a kid profile and the cached catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct KidProgress {
    pub kid_id: String,
    pub badge_count: usize,
    pub points: u32,
    pub completed_activities: usize,
    /// Enrolled courses that resolve against the cached course list.
    pub enrolled_courses: Vec<Course>,
    pub total_lessons: usize,
}

impl AppSession {
    pub fn from_json(json: &str) -> PortResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| PortError::Unexpected(format!("Corrupt session blob: {}", e)))
    }

    pub fn to_json(&self) -> PortResult<String> {
        serde_json::to_string(self).map_err(|e| PortError::Unexpected(e.to_string()))
    }

    // --- Profile lookups ---

    pub fn active_kid(&self) -> Option<&KidProfile> {
        let id = self.active_kid_id.as_deref()?;
        self.kid_profiles.iter().find(|k| k.id == id)
    }

    pub fn active_parent(&self) -> Option<&ParentProfile> {
        let id = self.active_parent_id.as_deref()?;
        self.parent_profiles.iter().find(|p| p.id == id)
    }

    pub fn active_admin(&self) -> Option<&AdminProfile> {
        let id = self.active_admin_id.as_deref()?;
        self.admin_profiles.iter().find(|a| a.id == id)
    }

    pub fn kid(&self, kid_id: &str) -> Option<&KidProfile> {
        self.kid_profiles.iter().find(|k| k.id == kid_id)
    }

    pub fn kid_mut(&mut self, kid_id: &str) -> PortResult<&mut KidProfile> {
        self.kid_profiles
            .iter_mut()
            .find(|k| k.id == kid_id)
            .ok_or_else(|| PortError::NotFound(format!("No kid profile with id '{}'", kid_id)))
    }

    pub fn kids_of<'a>(&'a self, parent_id: &'a str) -> impl Iterator<Item = &'a KidProfile> + 'a {
        self.kid_profiles.iter().filter(move |k| k.parent_id == parent_id)
    }

    pub fn controls_for(&self, kid_id: &str) -> Option<&ParentalControls> {
        self.parental_controls.get(kid_id)
    }

    // --- Role and profile changes ---

    pub fn apply(&mut self, correction: SessionCorrection) {
        match correction {
            SessionCorrection::DemoteToParent => {
                self.active_kid_id = None;
                self.role = Some(Role::Parent);
            }
            SessionCorrection::ClearRole => {
                self.role = None;
                self.active_kid_id = None;
                self.active_parent_id = None;
                self.active_teacher_id = None;
                self.active_admin_id = None;
            }
            SessionCorrection::ClearParentProfile => self.active_parent_id = None,
            SessionCorrection::ClearTeacherProfile => self.active_teacher_id = None,
            SessionCorrection::ClearAdminProfile => self.active_admin_id = None,
        }
    }

    /// Adds a kid under `parent_id` with default parental controls.
    pub fn add_kid(
        &mut self,
        parent_id: &str,
        name: &str,
        age: u8,
        avatar: &str,
    ) -> PortResult<KidProfile> {
        if name.trim().is_empty() {
            return Err(PortError::InvalidInput("Kid name must not be empty".to_string()));
        }
        let kid = KidProfile {
            id: format!("kid_{}", Uuid::new_v4().simple()),
            parent_id: parent_id.to_string(),
            name: name.trim().to_string(),
            age,
            avatar: avatar.to_string(),
            badges: Vec::new(),
            enrolled_course_ids: Vec::new(),
            completed_activity_ids: Vec::new(),
            points: 0,
        };
        self.parental_controls
            .insert(kid.id.clone(), ParentalControls::new(kid.id.clone()));
        self.kid_profiles.push(kid.clone());
        Ok(kid)
    }

    // --- Kid progress ---

    /// Awards a badge by name. Awarding the same badge twice is a no-op.
    pub fn award_badge(&mut self, kid_id: &str, badge_name: &str) -> PortResult<()> {
        let kid = self.kid_mut(kid_id)?;
        if kid.badges.iter().any(|b| b.name == badge_name) {
            return Ok(());
        }
        kid.badges.push(Badge {
            id: format!("badge_{}", Uuid::new_v4().simple()),
            name: badge_name.to_string(),
            earned_at: Utc::now(),
        });
        Ok(())
    }

    pub fn enroll_in_course(&mut self, kid_id: &str, course_id: &str) -> PortResult<()> {
        let kid = self.kid_mut(kid_id)?;
        if !kid.enrolled_course_ids.iter().any(|c| c == course_id) {
            kid.enrolled_course_ids.push(course_id.to_string());
        }
        Ok(())
    }

    /// Marks an activity done and credits its points once.
    pub fn complete_activity(&mut self, kid_id: &str, activity: &Activity) -> PortResult<()> {
        let kid = self.kid_mut(kid_id)?;
        if kid.completed_activity_ids.iter().any(|a| *a == activity.id) {
            return Ok(());
        }
        kid.completed_activity_ids.push(activity.id.clone());
        kid.points = kid.points.saturating_add(activity.points);
        Ok(())
    }

    pub fn kid_progress(&self, kid_id: &str, courses: &[Course]) -> Option<KidProgress> {
        let kid = self.kid(kid_id)?;
        let enrolled_courses: Vec<Course> = kid
            .enrolled_course_ids
            .iter()
            .filter_map(|id| courses.iter().find(|c| &c.id == id).cloned())
            .collect();
        let total_lessons = enrolled_courses.iter().map(|c| c.lessons.len()).sum();
        Some(KidProgress {
            kid_id: kid.id.clone(),
            badge_count: kid.badges.len(),
            points: kid.points,
            completed_activities: kid.completed_activity_ids.len(),
            enrolled_courses,
            total_lessons,
        })
    }

    // --- Chat ---

    /// Returns the id of the conversation between `a` and `b`, creating it the
    /// first time. At most one conversation exists per unordered pair.
    pub fn start_or_go_to_chat(&mut self, a: &str, b: &str) -> PortResult<String> {
        if a == b {
            return Err(PortError::InvalidInput(
                "A conversation needs two different participants".to_string(),
            ));
        }
        if let Some(existing) = self.chat_conversations.iter().find(|c| c.is_between(a, b)) {
            return Ok(existing.id.clone());
        }
        let conversation = ChatConversation {
            id: format!("chat_{}", Uuid::new_v4().simple()),
            participant_ids: vec![a.to_string(), b.to_string()],
            created_at: Utc::now(),
            last_message_at: None,
        };
        let id = conversation.id.clone();
        self.chat_conversations.push(conversation);
        Ok(id)
    }

    pub fn send_message(
        &mut self,
        conversation_id: &str,
        sender_id: &str,
        text: &str,
    ) -> PortResult<ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PortError::InvalidInput("Message must not be empty".to_string()));
        }
        let conversation = self
            .chat_conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
            .ok_or_else(|| {
                PortError::NotFound(format!("No conversation with id '{}'", conversation_id))
            })?;
        if !conversation.participant_ids.iter().any(|p| p == sender_id) {
            return Err(PortError::InvalidInput(format!(
                "'{}' is not part of conversation '{}'",
                sender_id, conversation_id
            )));
        }
        let message = ChatMessage {
            id: format!("msg_{}", Uuid::new_v4().simple()),
            conversation_id: conversation_id.to_string(),
            sender_id: sender_id.to_string(),
            text: text.to_string(),
            sent_at: Utc::now(),
        };
        conversation.last_message_at = Some(message.sent_at);
        self.chat_messages.push(message.clone());
        Ok(message)
    }

    pub fn messages_for<'a>(
        &'a self,
        conversation_id: &'a str,
    ) -> impl Iterator<Item = &'a ChatMessage> + 'a {
        self.chat_messages
            .iter()
            .filter(move |m| m.conversation_id == conversation_id)
    }

    pub fn conversations_of<'a>(
        &'a self,
        participant_id: &'a str,
    ) -> impl Iterator<Item = &'a ChatConversation> + 'a {
        self.chat_conversations
            .iter()
            .filter(move |c| c.participant_ids.iter().any(|p| p == participant_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ActivityCategory, ActivityContent, ActivityStatus, AgeGroup, GameContent};

    fn session_with_kid() -> (AppSession, String) {
        let mut session = AppSession::default();
        session.parent_profiles.push(ParentProfile {
            id: "parent_1".to_string(),
            name: "Pat".to_string(),
            email: "pat@example.com".to_string(),
        });
        let kid = session.add_kid("parent_1", "Sam", 7, "🦊").unwrap();
        (session, kid.id)
    }

    #[test]
    fn start_or_go_to_chat_is_idempotent_for_a_pair() {
        let mut session = AppSession::default();
        let first = session.start_or_go_to_chat("parent_1", "teacher_1").unwrap();
        let second = session.start_or_go_to_chat("parent_1", "teacher_1").unwrap();
        let reversed = session.start_or_go_to_chat("teacher_1", "parent_1").unwrap();
        assert_eq!(first, second);
        assert_eq!(first, reversed);
        assert_eq!(session.chat_conversations.len(), 1);
    }

    #[test]
    fn send_message_updates_conversation() {
        let mut session = AppSession::default();
        let id = session.start_or_go_to_chat("a", "b").unwrap();
        session.send_message(&id, "a", "hello").unwrap();
        session.send_message(&id, "b", "hi!").unwrap();
        let texts: Vec<_> = session.messages_for(&id).map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["hello", "hi!"]);
        assert!(session.chat_conversations[0].last_message_at.is_some());
        assert!(session.send_message(&id, "c", "intruder").is_err());
    }

    #[test]
    fn add_kid_creates_default_controls() {
        let (session, kid_id) = session_with_kid();
        let controls = session.controls_for(&kid_id).unwrap();
        assert!(controls.allowed_categories.is_empty());
        assert!(!controls.chat_enabled);
        assert_eq!(session.kids_of("parent_1").count(), 1);
    }

    #[test]
    fn progress_is_derived_from_profile_and_cached_courses() {
        let (mut session, kid_id) = session_with_kid();
        session.award_badge(&kid_id, "First Story").unwrap();
        session.award_badge(&kid_id, "First Story").unwrap();
        session.enroll_in_course(&kid_id, "course_known").unwrap();
        session.enroll_in_course(&kid_id, "course_gone").unwrap();
        let activity = Activity {
            id: "act".to_string(),
            title: "Maze".to_string(),
            description: String::new(),
            category: ActivityCategory::Math,
            status: ActivityStatus::Approved,
            age_groups: vec![AgeGroup::Ages6To8],
            points: 15,
            created_by: None,
            content: ActivityContent::Game(GameContent {
                instructions: "Find the exit".to_string(),
            }),
        };
        session.complete_activity(&kid_id, &activity).unwrap();
        session.complete_activity(&kid_id, &activity).unwrap();

        let courses = vec![Course {
            id: "course_known".to_string(),
            teacher_id: "t".to_string(),
            title: "Counting".to_string(),
            description: String::new(),
            category: ActivityCategory::Math,
            age_groups: vec![],
            lessons: vec![],
            price_one_time: None,
            price_monthly: Some(3.0),
            status: crate::domain::CourseStatus::Active,
        }];
        let progress = session.kid_progress(&kid_id, &courses).unwrap();
        assert_eq!(progress.badge_count, 1);
        assert_eq!(progress.points, 15);
        assert_eq!(progress.completed_activities, 1);
        assert_eq!(progress.enrolled_courses.len(), 1);
    }

    fn game_worth(id: &str, points: u32) -> Activity {
        Activity {
            id: id.to_string(),
            title: "Maze".to_string(),
            description: String::new(),
            category: ActivityCategory::Coding,
            status: ActivityStatus::Approved,
            age_groups: vec![AgeGroup::Ages6To8],
            points,
            created_by: None,
            content: ActivityContent::Game(GameContent {
                instructions: "Find the exit".to_string(),
            }),
        }
    }

    #[test]
    fn points_saturate_instead_of_overflowing() {
        let (mut session, kid_id) = session_with_kid();
        session
            .complete_activity(&kid_id, &game_worth("huge", u32::MAX))
            .unwrap();
        session
            .complete_activity(&kid_id, &game_worth("small", 1))
            .unwrap();
        let kid = session.kid(&kid_id).unwrap();
        assert_eq!(kid.points, u32::MAX);
        assert_eq!(kid.completed_activity_ids.len(), 2);
    }

    #[test]
    fn corrections_clear_the_right_fields() {
        let (mut session, kid_id) = session_with_kid();
        session.role = Some(Role::Kid);
        session.active_parent_id = Some("parent_1".to_string());
        session.active_kid_id = Some(kid_id);
        session.apply(SessionCorrection::DemoteToParent);
        assert_eq!(session.role, Some(Role::Parent));
        assert!(session.active_kid_id.is_none());
        session.apply(SessionCorrection::ClearRole);
        assert_eq!(session.role, None);
        assert!(session.active_parent_id.is_none());
    }

    #[test]
    fn blob_round_trips_and_tolerates_missing_fields() {
        let (session, _) = session_with_kid();
        let restored = AppSession::from_json(&session.to_json().unwrap()).unwrap();
        assert_eq!(restored, session);
        let sparse = AppSession::from_json(r#"{"role":"Parent"}"#).unwrap();
        assert_eq!(sparse.role, Some(Role::Parent));
        assert!(sparse.chat_conversations.is_empty());
    }
}
