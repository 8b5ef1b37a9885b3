//! crates/kids_learning_core/src/views.rs
//!
//! The app's named screens, which role may sit on which screen, and the
//! path segment <-> view table the routing guard derives the current view from.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::Role;

/// Every screen the app can show. Doubles as the routing guard's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum View {
    // Entry
    Splash,
    RoleSelection,
    Login,

    // Shared by several roles
    Settings,
    Chat,
    ChatList,

    // Kid
    KidHome,
    Activities,
    ActivityPlayer,
    Stories,
    StoryReader,
    StoryMaker,
    Quiz,
    Games,
    Drawing,
    MyCourses,
    LessonPlayer,
    Badges,
    Rewards,
    AskAi,

    // Parent
    ParentSetup,
    AddKid,
    ProfileSelection,
    ParentDashboard,
    KidProgress,
    ParentalControls,
    CourseCatalog,
    CourseDetail,
    TeacherDirectory,
    TeacherDetail,
    WriteReview,
    Subscriptions,

    // Teacher
    TeacherDashboard,
    TeacherCourses,
    CreateCourse,
    EditCourse,
    TeacherActivities,
    CreateActivity,
    TeacherVerification,
    TeacherProfileEdit,
    TeacherReviews,
    TeacherEarnings,

    // Admin
    AdminDashboard,
    AdminTeachers,
    AdminTeacherReview,
    AdminCourses,
    AdminActivities,
    AdminReports,
}

use View::*;

impl View {
    pub const ALL: &'static [View] = &[
        Splash,
        RoleSelection,
        Login,
        Settings,
        Chat,
        ChatList,
        KidHome,
        Activities,
        ActivityPlayer,
        Stories,
        StoryReader,
        StoryMaker,
        Quiz,
        Games,
        Drawing,
        MyCourses,
        LessonPlayer,
        Badges,
        Rewards,
        AskAi,
        ParentSetup,
        AddKid,
        ProfileSelection,
        ParentDashboard,
        KidProgress,
        ParentalControls,
        CourseCatalog,
        CourseDetail,
        TeacherDirectory,
        TeacherDetail,
        WriteReview,
        Subscriptions,
        TeacherDashboard,
        TeacherCourses,
        CreateCourse,
        EditCourse,
        TeacherActivities,
        CreateActivity,
        TeacherVerification,
        TeacherProfileEdit,
        TeacherReviews,
        TeacherEarnings,
        AdminDashboard,
        AdminTeachers,
        AdminTeacherReview,
        AdminCourses,
        AdminActivities,
        AdminReports,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Splash => "Splash",
            RoleSelection => "RoleSelection",
            Login => "Login",
            Settings => "Settings",
            Chat => "Chat",
            ChatList => "ChatList",
            KidHome => "KidHome",
            Activities => "Activities",
            ActivityPlayer => "ActivityPlayer",
            Stories => "Stories",
            StoryReader => "StoryReader",
            StoryMaker => "StoryMaker",
            Quiz => "Quiz",
            Games => "Games",
            Drawing => "Drawing",
            MyCourses => "MyCourses",
            LessonPlayer => "LessonPlayer",
            Badges => "Badges",
            Rewards => "Rewards",
            AskAi => "AskAi",
            ParentSetup => "ParentSetup",
            AddKid => "AddKid",
            ProfileSelection => "ProfileSelection",
            ParentDashboard => "ParentDashboard",
            KidProgress => "KidProgress",
            ParentalControls => "ParentalControls",
            CourseCatalog => "CourseCatalog",
            CourseDetail => "CourseDetail",
            TeacherDirectory => "TeacherDirectory",
            TeacherDetail => "TeacherDetail",
            WriteReview => "WriteReview",
            Subscriptions => "Subscriptions",
            TeacherDashboard => "TeacherDashboard",
            TeacherCourses => "TeacherCourses",
            CreateCourse => "CreateCourse",
            EditCourse => "EditCourse",
            TeacherActivities => "TeacherActivities",
            CreateActivity => "CreateActivity",
            TeacherVerification => "TeacherVerification",
            TeacherProfileEdit => "TeacherProfileEdit",
            TeacherReviews => "TeacherReviews",
            TeacherEarnings => "TeacherEarnings",
            AdminDashboard => "AdminDashboard",
            AdminTeachers => "AdminTeachers",
            AdminTeacherReview => "AdminTeacherReview",
            AdminCourses => "AdminCourses",
            AdminActivities => "AdminActivities",
            AdminReports => "AdminReports",
        }
    }

    /// The role-agnostic screens anyone may see before picking a role.
    pub fn is_entry(self) -> bool {
        matches!(self, Splash | RoleSelection | Login)
    }

    pub fn is_legal_for(self, role: Role) -> bool {
        legal_views(role).contains(&self)
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

const KID_VIEWS: &[View] = &[
    KidHome,
    Activities,
    ActivityPlayer,
    Stories,
    StoryReader,
    StoryMaker,
    Quiz,
    Games,
    Drawing,
    MyCourses,
    LessonPlayer,
    Badges,
    Rewards,
    AskAi,
    Settings,
    Chat,
    ChatList,
];

const PARENT_VIEWS: &[View] = &[
    ParentSetup,
    AddKid,
    ProfileSelection,
    ParentDashboard,
    KidProgress,
    ParentalControls,
    CourseCatalog,
    CourseDetail,
    TeacherDirectory,
    TeacherDetail,
    WriteReview,
    Subscriptions,
    Settings,
    Chat,
    ChatList,
];

const TEACHER_VIEWS: &[View] = &[
    TeacherDashboard,
    TeacherCourses,
    CreateCourse,
    EditCourse,
    TeacherActivities,
    CreateActivity,
    TeacherVerification,
    TeacherProfileEdit,
    TeacherReviews,
    TeacherEarnings,
    Settings,
    Chat,
    ChatList,
];

const ADMIN_VIEWS: &[View] = &[
    AdminDashboard,
    AdminTeachers,
    AdminTeacherReview,
    AdminCourses,
    AdminActivities,
    AdminReports,
    Settings,
];

/// The screens a role may legally be positioned on. Entry views are not part
/// of any role's set.
pub fn legal_views(role: Role) -> &'static [View] {
    match role {
        Role::Kid => KID_VIEWS,
        Role::Parent => PARENT_VIEWS,
        Role::Teacher => TEACHER_VIEWS,
        Role::Admin => ADMIN_VIEWS,
    }
}

/// Where each role lands when it is bounced off an illegal screen.
pub fn home_view(role: Role) -> View {
    match role {
        Role::Kid => KidHome,
        Role::Parent => ProfileSelection,
        Role::Teacher => TeacherDashboard,
        Role::Admin => AdminDashboard,
    }
}

//=========================================================================================
// Path table
//=========================================================================================

/// Bidirectional mapping between a path's first segment and a view.
///
/// Built once at startup and handed to whatever needs to translate paths.
/// Segments are the lower-cased view name, so `/kidhome` and `/KidHome` both
/// resolve to `View::KidHome`.
#[derive(Debug, Clone)]
pub struct RouteTable {
    by_segment: HashMap<String, View>,
    by_view: HashMap<View, String>,
}

impl RouteTable {
    pub fn new() -> Self {
        let mut by_segment = HashMap::with_capacity(View::ALL.len());
        let mut by_view = HashMap::with_capacity(View::ALL.len());
        for view in View::ALL {
            let segment = view.name().to_ascii_lowercase();
            by_segment.insert(segment.clone(), *view);
            by_view.insert(*view, segment);
        }
        Self { by_segment, by_view }
    }

    /// Derives the current view from a navigation path. Unknown paths and the
    /// root resolve to `Splash`.
    pub fn view_for_path(&self, path: &str) -> View {
        first_segment(path)
            .and_then(|segment| self.by_segment.get(&segment.to_ascii_lowercase()).copied())
            .unwrap_or(Splash)
    }

    /// The canonical path for a view, e.g. `/kidhome`.
    pub fn path_for(&self, view: View) -> String {
        match self.by_view.get(&view) {
            Some(segment) => format!("/{}", segment),
            None => format!("/{}", view.name().to_ascii_lowercase()),
        }
    }

    /// True when `path` names a view explicitly (as opposed to falling back).
    pub fn is_known(&self, path: &str) -> bool {
        first_segment(path)
            .map(|segment| self.by_segment.contains_key(&segment.to_ascii_lowercase()))
            .unwrap_or(false)
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

/// The first non-empty path segment, ignoring any query string or fragment.
fn first_segment(path: &str) -> Option<&str> {
    let path = path.split(['?', '#']).next().unwrap_or("");
    path.split('/').find(|s| !s.is_empty())
}

/// True for `/`, the empty path, and paths made only of slashes.
pub fn is_root_path(path: &str) -> bool {
    first_segment(path).is_none()
}
