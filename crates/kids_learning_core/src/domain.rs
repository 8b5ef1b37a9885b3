//! crates/kids_learning_core/src/domain.rs
//!
//! Defines the core records of the platform: the server-side catalog
//! (teachers, courses, activities) and the client-local identities that only
//! ever live in the app's persisted session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

//=========================================================================================
// Roles
//=========================================================================================

/// The four kinds of user the app can be operated as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub enum Role {
    Kid,
    Parent,
    Teacher,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Kid => write!(f, "kid"),
            Role::Parent => write!(f, "parent"),
            Role::Teacher => write!(f, "teacher"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "kid" => Ok(Role::Kid),
            "parent" => Ok(Role::Parent),
            "teacher" => Ok(Role::Teacher),
            "admin" => Ok(Role::Admin),
            other => Err(format!("'{}' is not a role", other)),
        }
    }
}

//=========================================================================================
// Teachers
//=========================================================================================

/// Where a teacher is in the verification workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub enum VerificationStatus {
    #[default]
    NotSubmitted,
    Pending,
    Verified,
    Rejected,
}

/// A parent's review of a teacher. Reviews are never edited once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Review {
    pub id: String,
    pub teacher_id: String,
    pub parent_id: String,
    pub parent_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct TeacherProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub bio: String,
    pub avatar: String,
    pub subjects: Vec<String>,
    pub certificates: Vec<String>,
    /// Average of all review ratings, 0.0 when there are none.
    pub rating: f32,
    pub rating_count: u32,
    pub reviews: Vec<Review>,
    pub verification_status: VerificationStatus,
    /// Mirrors `verification_status == Verified`.
    pub is_verified: bool,
}

impl TeacherProfile {
    /// Sets the verification lifecycle field and keeps `is_verified` in step.
    pub fn set_verification_status(&mut self, status: VerificationStatus) {
        self.verification_status = status;
        self.is_verified = status == VerificationStatus::Verified;
    }

    /// Appends a review and recomputes the rating summary.
    pub fn add_review(&mut self, review: Review) {
        self.reviews.push(review);
        self.rating_count = self.reviews.len() as u32;
        let total: u32 = self.reviews.iter().map(|r| u32::from(r.rating)).sum();
        self.rating = total as f32 / self.rating_count as f32;
    }
}

//=========================================================================================
// Courses
//=========================================================================================

/// Publication stage of a course. `Draft` and `Completed` exist on records but
/// can never be set through a status patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub enum CourseStatus {
    Draft,
    Pending,
    Active,
    Rejected,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub description: String,
    pub duration_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Course {
    pub id: String,
    /// Owning teacher. Not checked against the teacher collection.
    pub teacher_id: String,
    pub title: String,
    pub description: String,
    pub category: ActivityCategory,
    pub age_groups: Vec<AgeGroup>,
    pub lessons: Vec<Lesson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_one_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_monthly: Option<f64>,
    pub status: CourseStatus,
}

/// A teacher's course submission, stored as `Pending`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct NewCourse {
    pub teacher_id: String,
    pub title: String,
    pub description: String,
    pub category: ActivityCategory,
    pub age_groups: Vec<AgeGroup>,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    #[serde(default)]
    pub price_one_time: Option<f64>,
    #[serde(default)]
    pub price_monthly: Option<f64>,
}

//=========================================================================================
// Activities
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub enum ActivityCategory {
    Math,
    Reading,
    Science,
    Art,
    Music,
    Coding,
    Languages,
    LifeSkills,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub enum AgeGroup {
    #[serde(rename = "3-5")]
    Ages3To5,
    #[serde(rename = "6-8")]
    Ages6To8,
    #[serde(rename = "9-12")]
    Ages9To12,
}

impl AgeGroup {
    /// The bracket a kid of `age` falls into. Ages outside 3..=12 clamp to the
    /// nearest bracket.
    pub fn for_age(age: u8) -> Self {
        match age {
            0..=5 => AgeGroup::Ages3To5,
            6..=8 => AgeGroup::Ages6To8,
            _ => AgeGroup::Ages9To12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub enum ActivityStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StoryContent {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub illustration_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct QuizContent {
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct VideoContent {
    pub url: String,
    pub duration_seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct GameContent {
    pub instructions: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct DrawingContent {
    pub prompt: String,
}

/// The playable payload of an activity, keyed by its content type. Each
/// variant only carries the fields that content type uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "contentType", content = "content")]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub enum ActivityContent {
    Story(StoryContent),
    Quiz(QuizContent),
    Video(VideoContent),
    Game(GameContent),
    Drawing(DrawingContent),
}

impl ActivityContent {
    pub fn content_type(&self) -> &'static str {
        match self {
            ActivityContent::Story(_) => "Story",
            ActivityContent::Quiz(_) => "Quiz",
            ActivityContent::Video(_) => "Video",
            ActivityContent::Game(_) => "Game",
            ActivityContent::Drawing(_) => "Drawing",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Activity {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: ActivityCategory,
    pub status: ActivityStatus,
    pub age_groups: Vec<AgeGroup>,
    /// Points a kid earns for completing the activity.
    pub points: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(flatten)]
    pub content: ActivityContent,
}

/// A teacher's activity submission, stored as `Pending`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct NewActivity {
    pub title: String,
    pub description: String,
    pub category: ActivityCategory,
    pub age_groups: Vec<AgeGroup>,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(flatten)]
    pub content: ActivityContent,
}

/// A parent's review submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct NewReview {
    pub parent_id: String,
    pub parent_name: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub course_id: Option<String>,
}

//=========================================================================================
// Client-local identities
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub earned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KidProfile {
    pub id: String,
    pub parent_id: String,
    pub name: String,
    pub age: u8,
    pub avatar: String,
    #[serde(default)]
    pub badges: Vec<Badge>,
    #[serde(default)]
    pub enrolled_course_ids: Vec<String>,
    #[serde(default)]
    pub completed_activity_ids: Vec<String>,
    #[serde(default)]
    pub points: u32,
}

impl KidProfile {
    pub fn age_group(&self) -> AgeGroup {
        AgeGroup::for_age(self.age)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentProfile {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Per-kid restrictions a parent configures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentalControls {
    pub kid_id: String,
    #[serde(default)]
    pub daily_time_limit_minutes: Option<u32>,
    /// Empty means every category is allowed.
    #[serde(default)]
    pub allowed_categories: Vec<ActivityCategory>,
    pub chat_enabled: bool,
    /// PHC-format argon2 hash of the PIN needed to leave kid mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin_hash: Option<String>,
}

impl ParentalControls {
    pub fn new(kid_id: impl Into<String>) -> Self {
        Self {
            kid_id: kid_id.into(),
            daily_time_limit_minutes: None,
            allowed_categories: Vec::new(),
            chat_enabled: false,
            pin_hash: None,
        }
    }

    pub fn allows(&self, category: ActivityCategory) -> bool {
        self.allowed_categories.is_empty() || self.allowed_categories.contains(&category)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatConversation {
    pub id: String,
    pub participant_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_message_at: Option<DateTime<Utc>>,
}

impl ChatConversation {
    /// True when this conversation is between exactly `a` and `b`, in either order.
    pub fn is_between(&self, a: &str, b: &str) -> bool {
        self.participant_ids.len() == 2
            && self.participant_ids.iter().any(|p| p == a)
            && self.participant_ids.iter().any(|p| p == b)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}
