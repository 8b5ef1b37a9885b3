use std::sync::Arc;

use api_lib::{config::Config, seeded_state, web::api_routes};
use app_lib::{
    ApiClient, AppController, ClientError, HttpTransport, MemoryStorage, RouterTransport,
};
use kids_learning_core::{CourseStatus, RouteTable, RoutingGuard};
use tokio::net::TcpListener;

/// Serves a freshly seeded backend on an ephemeral local port.
async fn spawn_backend() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = api_routes(seeded_state(Config::default()));
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn controller(base_url: &str) -> AppController<HttpTransport> {
    AppController::new(
        ApiClient::new(HttpTransport::new(base_url).unwrap()),
        Arc::new(MemoryStorage::new()),
        RoutingGuard::new(RouteTable::new()),
    )
}

#[tokio::test]
async fn loads_and_patches_over_http() {
    let base_url = spawn_backend().await;
    let mut app = controller(&base_url);
    app.load_collections().await;
    assert_eq!(app.teachers().len(), 4);
    assert_eq!(app.courses().len(), 4);
    assert_eq!(app.activities().len(), 5);

    let course = app
        .update_course_status("course_science_lab", "Active")
        .await
        .unwrap();
    assert_eq!(course.status, CourseStatus::Active);

    let courses = ApiClient::new(HttpTransport::new(format!("{}/", base_url)).unwrap())
        .get_courses()
        .await
        .unwrap();
    let seen = courses.iter().find(|c| c.id == "course_science_lab").unwrap();
    assert_eq!(seen.status, CourseStatus::Active);
}

#[tokio::test]
async fn server_errors_keep_their_status_over_http() {
    let base_url = spawn_backend().await;
    let api = ApiClient::new(HttpTransport::new(base_url.as_str()).unwrap());

    let err = api
        .update_course_status("course_math_101", "Deleted")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));

    let err = api
        .update_course_status("no such/course?", "Active")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn odd_ids_reach_the_router_as_one_segment() {
    let api = ApiClient::new(RouterTransport::new(api_routes(seeded_state(
        Config::default(),
    ))));
    let err = api
        .update_teacher_verification("teacher x/verify", "Verified")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn unreachable_server_is_a_network_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let base_url = format!("http://{}", addr);

    let api = ApiClient::new(HttpTransport::new(base_url.as_str()).unwrap());
    assert!(matches!(api.get_teachers().await, Err(ClientError::Transport(_))));

    let mut app = controller(&base_url);
    app.load_collections().await;
    assert!(!app.is_loading());
    assert!(app.teachers().is_empty());
}

#[test]
fn base_url_needs_a_scheme() {
    assert!(HttpTransport::new("localhost:3000").is_err());
    assert!(HttpTransport::new("").is_err());
    let transport = HttpTransport::new(" http://127.0.0.1:3000/ ").unwrap();
    assert_eq!(transport.base_url(), "http://127.0.0.1:3000");
}
