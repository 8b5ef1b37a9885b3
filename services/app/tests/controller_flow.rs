use std::sync::Arc;

use api_lib::{config::Config, seeded_state, web::api_routes};
use app_lib::{
    ApiClient, ApiRequest, ApiResponse, AppController, AppError, ClientError, MemoryStorage,
    OfflineTransport, RouterTransport, Transport,
};
use async_trait::async_trait;
use axum::{http::Method, Router};
use kids_learning_core::{
    ActivityCategory, AgeGroup, AppSession, CourseStatus, NewCourse, ParentProfile, PortError,
    Role, RouteTable, RoutingGuard, StateStorage, View, STATE_STORAGE_KEY,
};

fn backend() -> Router {
    api_routes(seeded_state(Config::default()))
}

fn controller_with<T: Transport>(transport: T, storage: Arc<MemoryStorage>) -> AppController<T> {
    AppController::new(
        ApiClient::new(transport),
        storage,
        RoutingGuard::new(RouteTable::new()),
    )
}

async fn loaded(router: &Router, storage: Arc<MemoryStorage>) -> AppController<RouterTransport> {
    let mut app = controller_with(RouterTransport::new(router.clone()), storage);
    app.load_collections().await;
    app
}

/// Signs in a new parent with one seven-year-old kid and returns the kid id.
fn parent_with_kid(app: &mut AppController<RouterTransport>) -> String {
    app.select_role(Role::Parent);
    app.login_parent("Pat", "pat@example.com").unwrap();
    app.add_kid("Mia", 7, "owl").unwrap().id
}

/// Lets reads through but fails every status patch.
struct ReadOnlyTransport(RouterTransport);

#[async_trait]
impl Transport for ReadOnlyTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        if request.method == Method::PATCH {
            return Err(ClientError::Transport("connection reset".to_string()));
        }
        self.0.send(request).await
    }
}

#[tokio::test]
async fn root_path_settles_on_splash() {
    let app = controller_with(OfflineTransport, Arc::new(MemoryStorage::new()));
    assert_eq!(app.current_view(), View::Splash);
    assert_eq!(app.current_path(), "/splash");
    assert_eq!(app.history().len(), 1);
    assert!(app.is_loading());
}

#[tokio::test]
async fn parent_without_kids_is_replaced_onto_setup() {
    let router = backend();
    let mut app = loaded(&router, Arc::new(MemoryStorage::new())).await;

    assert_eq!(app.select_role(Role::Parent), View::Login);
    app.login_parent("Pat", "pat@example.com").unwrap();
    assert_eq!(app.current_view(), View::ParentSetup);
    let before = app.history().len();

    assert_eq!(app.navigate("/parentdashboard"), View::ParentSetup);
    assert_eq!(app.history().len(), before + 1);
    assert_eq!(app.history().last().map(String::as_str), Some("/parentsetup"));
    assert!(!app.history().iter().any(|p| p == "/parentdashboard"));
}

#[tokio::test]
async fn bad_email_is_rejected() {
    let router = backend();
    let mut app = loaded(&router, Arc::new(MemoryStorage::new())).await;
    app.select_role(Role::Parent);
    let err = app.login_parent("Pat", "not-an-email").unwrap_err();
    assert!(matches!(err, AppError::Port(PortError::InvalidInput(_))));
    assert!(app.session().active_parent_id.is_none());
}

#[tokio::test]
async fn kid_mode_filters_activities_and_needs_pin_to_leave() {
    let router = backend();
    let mut app = loaded(&router, Arc::new(MemoryStorage::new())).await;
    let kid_id = parent_with_kid(&mut app);
    app.set_parental_pin(&kid_id, "2468").unwrap();

    assert_eq!(app.select_kid(&kid_id).unwrap(), View::KidHome);
    let mut ids: Vec<&str> = app.kid_activities().into_iter().map(|a| a.id.as_str()).collect();
    ids.sort();
    assert_eq!(ids, vec!["activity_game_maze", "activity_story_moon"]);

    assert_eq!(app.navigate("/parentdashboard"), View::KidHome);

    assert!(matches!(app.exit_kid_mode(Some("0000")), Err(AppError::WrongPin)));
    assert!(matches!(app.exit_kid_mode(None), Err(AppError::WrongPin)));
    assert_eq!(app.session().role, Some(Role::Kid));

    assert_eq!(app.exit_kid_mode(Some("2468")).unwrap(), View::ProfileSelection);
    assert_eq!(app.session().role, Some(Role::Parent));
    assert!(app.session().active_kid_id.is_none());
}

#[tokio::test]
async fn allowed_categories_narrow_kid_activities() {
    let router = backend();
    let mut app = loaded(&router, Arc::new(MemoryStorage::new())).await;
    let kid_id = parent_with_kid(&mut app);
    app.update_parental_controls(&kid_id, Some(30), vec![ActivityCategory::Reading], false)
        .unwrap();
    app.select_kid(&kid_id).unwrap();

    let ids: Vec<&str> = app.kid_activities().into_iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["activity_story_moon"]);
}

#[tokio::test]
async fn completing_an_activity_credits_points_once() {
    let router = backend();
    let mut app = loaded(&router, Arc::new(MemoryStorage::new())).await;
    let kid_id = parent_with_kid(&mut app);
    app.select_kid(&kid_id).unwrap();

    let kid = app.complete_activity("activity_story_moon").unwrap();
    assert_eq!(kid.points, 10);
    assert!(kid.badges.iter().any(|b| b.name == "Reading Explorer"));

    let kid = app.complete_activity("activity_story_moon").unwrap();
    assert_eq!(kid.points, 10);
    assert_eq!(kid.badges.len(), 1);

    let progress = app.kid_progress(&kid_id).unwrap();
    assert_eq!(progress.completed_activities, 1);
}

#[tokio::test]
async fn enrollment_needs_an_active_course() {
    let router = backend();
    let mut app = loaded(&router, Arc::new(MemoryStorage::new())).await;
    let kid_id = parent_with_kid(&mut app);

    app.enroll_in_course(&kid_id, "course_math_101").unwrap();
    assert!(matches!(
        app.enroll_in_course(&kid_id, "course_music_draft"),
        Err(AppError::NotAllowed(_))
    ));

    let progress = app.kid_progress(&kid_id).unwrap();
    assert_eq!(progress.enrolled_courses.len(), 1);
    assert_eq!(progress.total_lessons, 3);
}

#[tokio::test]
async fn kid_chat_is_gated_and_idempotent() {
    let router = backend();
    let mut app = loaded(&router, Arc::new(MemoryStorage::new())).await;
    let kid_id = parent_with_kid(&mut app);
    app.select_kid(&kid_id).unwrap();

    assert!(matches!(app.chat_with("teacher_amira"), Err(AppError::NotAllowed(_))));

    app.update_parental_controls(&kid_id, None, vec![], true).unwrap();
    let first = app.chat_with("teacher_amira").unwrap();
    assert_eq!(app.current_view(), View::Chat);
    let second = app.start_or_go_to_chat("teacher_amira", &kid_id).unwrap();
    assert_eq!(first, second);
    assert_eq!(app.session().chat_conversations.len(), 1);

    app.send_message(&first, "Hi!").unwrap();
    let messages = app.messages_for(&first);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].sender_id, kid_id);
    assert!(app.send_message(&first, "   ").is_err());
}

#[tokio::test]
async fn admin_status_change_reaches_the_server() {
    let router = backend();
    let mut admin = loaded(&router, Arc::new(MemoryStorage::new())).await;
    admin.select_role(Role::Admin);
    admin.login_admin("Ada", "ada@example.com").unwrap();
    assert_eq!(admin.current_view(), View::AdminDashboard);

    let course = admin
        .update_course_status("course_science_lab", "Active")
        .await
        .unwrap();
    assert_eq!(course.status, CourseStatus::Active);

    let fresh = loaded(&router, Arc::new(MemoryStorage::new())).await;
    let seen = fresh
        .courses()
        .iter()
        .find(|c| c.id == "course_science_lab")
        .unwrap();
    assert_eq!(seen.status, CourseStatus::Active);
}

#[tokio::test]
async fn invalid_status_changes_nothing() {
    let router = backend();
    let mut app = loaded(&router, Arc::new(MemoryStorage::new())).await;
    let err = app
        .update_course_status("course_math_101", "Deleted")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Port(PortError::InvalidStatus { .. })));

    let cached = app.courses().iter().find(|c| c.id == "course_math_101").unwrap();
    assert_eq!(cached.status, CourseStatus::Active);
}

#[tokio::test]
async fn failed_patch_keeps_the_optimistic_copy() {
    let router = backend();
    let mut app = controller_with(
        ReadOnlyTransport(RouterTransport::new(router.clone())),
        Arc::new(MemoryStorage::new()),
    );
    app.load_collections().await;

    let err = app
        .update_teacher_verification("teacher_pending_approval", "Verified")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Client(ClientError::Transport(_))));

    let cached = app
        .teachers()
        .iter()
        .find(|t| t.id == "teacher_pending_approval")
        .unwrap();
    assert!(cached.is_verified);
}

#[tokio::test]
async fn offline_load_leaves_collections_empty() {
    let mut app = controller_with(OfflineTransport, Arc::new(MemoryStorage::new()));
    app.load_collections().await;
    assert!(!app.is_loading());
    assert!(app.teachers().is_empty());
    assert!(app.courses().is_empty());
    assert!(app.activities().is_empty());
}

#[tokio::test]
async fn session_survives_a_restart() {
    let router = backend();
    let storage = Arc::new(MemoryStorage::new());
    {
        let mut app = loaded(&router, storage.clone()).await;
        parent_with_kid(&mut app);
    }

    let mut app = loaded(&router, storage).await;
    assert_eq!(app.session().role, Some(Role::Parent));
    assert_eq!(app.session().kid_profiles.len(), 1);
    assert_eq!(app.navigate("/parentdashboard"), View::ParentDashboard);
}

#[tokio::test]
async fn corrupt_persisted_state_starts_fresh() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(STATE_STORAGE_KEY, "{not json").unwrap();
    let app = controller_with(OfflineTransport, storage);
    assert_eq!(app.session(), &AppSession::default());
    assert_eq!(app.current_view(), View::Splash);
}

#[tokio::test]
async fn stale_teacher_is_sent_back_to_login_after_loading() {
    let router = backend();
    let storage = Arc::new(MemoryStorage::new());
    let stale = AppSession {
        role: Some(Role::Teacher),
        active_teacher_id: Some("teacher_gone".to_string()),
        ..AppSession::default()
    };
    storage.set(STATE_STORAGE_KEY, &stale.to_json().unwrap()).unwrap();

    let mut app = controller_with(RouterTransport::new(router.clone()), storage);
    assert_eq!(app.navigate("/teacherdashboard"), View::TeacherDashboard);

    app.load_collections().await;
    assert_eq!(app.current_view(), View::Login);
    assert!(app.session().active_teacher_id.is_none());

    app.login_teacher("teacher_amira@kidslearn.example").unwrap();
    assert_eq!(app.current_view(), View::TeacherDashboard);
}

#[tokio::test]
async fn kid_role_without_a_kid_is_demoted_to_parent() {
    let router = backend();
    let storage = Arc::new(MemoryStorage::new());
    let parent = ParentProfile {
        id: "parent_1".to_string(),
        name: "Pat".to_string(),
        email: "pat@example.com".to_string(),
    };
    let session = AppSession {
        role: Some(Role::Kid),
        active_parent_id: Some(parent.id.clone()),
        parent_profiles: vec![parent],
        ..AppSession::default()
    };
    storage.set(STATE_STORAGE_KEY, &session.to_json().unwrap()).unwrap();

    let mut app = loaded(&router, storage).await;
    assert_eq!(app.navigate("/kidhome"), View::ParentSetup);
    assert_eq!(app.session().role, Some(Role::Parent));
}

#[tokio::test]
async fn teacher_submissions_are_owned_and_pending() {
    let router = backend();
    let mut app = loaded(&router, Arc::new(MemoryStorage::new())).await;
    app.select_role(Role::Teacher);
    app.login_teacher("teacher_amira@kidslearn.example").unwrap();

    let course = app
        .submit_course(NewCourse {
            teacher_id: String::new(),
            title: "Fractions".to_string(),
            description: "Halves and quarters".to_string(),
            category: ActivityCategory::Math,
            age_groups: vec![AgeGroup::Ages6To8],
            lessons: vec![],
            price_one_time: Some(9.0),
            price_monthly: None,
        })
        .await
        .unwrap();
    assert_eq!(course.teacher_id, "teacher_amira");
    assert_eq!(course.status, CourseStatus::Pending);
    assert!(app.courses().iter().any(|c| c.id == course.id));
}

#[tokio::test]
async fn parent_review_updates_the_teacher() {
    let router = backend();
    let mut app = loaded(&router, Arc::new(MemoryStorage::new())).await;
    parent_with_kid(&mut app);

    let teacher = app
        .submit_review("teacher_amira", 5, "Wonderful", Some("course_math_101"))
        .await
        .unwrap();
    assert_eq!(teacher.rating_count, 3);

    let err = app.submit_review("teacher_amira", 9, "", None).await.unwrap_err();
    assert!(matches!(err, AppError::Client(ClientError::Api { status: 400, .. })));
}

#[tokio::test]
async fn story_requests_surface_the_server_error() {
    let router = backend();
    let mut app = loaded(&router, Arc::new(MemoryStorage::new())).await;
    let kid_id = parent_with_kid(&mut app);
    app.select_kid(&kid_id).unwrap();

    let err = app.generate_story("a dragon who bakes").await.unwrap_err();
    assert!(matches!(err, AppError::Client(ClientError::Api { status: 503, .. })));
}
