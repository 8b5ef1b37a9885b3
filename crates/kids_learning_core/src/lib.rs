pub mod domain;
pub mod guard;
pub mod ports;
pub mod session;
pub mod status;
pub mod store;
pub mod views;

pub use domain::{
    Activity, ActivityCategory, ActivityContent, ActivityStatus, AdminProfile, AgeGroup, Badge,
    ChatConversation, ChatMessage, Course, CourseStatus, KidProfile, Lesson, NewActivity,
    NewCourse, NewReview, ParentProfile, ParentalControls, Review, Role, TeacherProfile,
    VerificationStatus,
};
pub use guard::{GuardContext, GuardDecision, Redirect, RoutingGuard};
pub use ports::{
    CatalogRepository, GeneratedStory, PortError, PortResult, StateStorage,
    StoryGenerationService,
};
pub use session::{AppSession, KidProgress, SessionCorrection, STATE_STORAGE_KEY};
pub use status::{validate_status, EntityKind, StatusChange};
pub use store::{Record, RecordStore};
pub use views::{RouteTable, View};
