//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the catalog endpoints and the master
//! definition for the OpenAPI document.

use crate::error::{error_response, port_error, ErrorBody, HandlerError};
use crate::web::ai::{AskRequest, AskResponse, StoryRequest};
use crate::web::state::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use kids_learning_core::domain::{
    Activity, ActivityCategory, ActivityContent, ActivityStatus, AgeGroup, Course, CourseStatus,
    DrawingContent, GameContent, Lesson, NewActivity, NewCourse, NewReview, QuizContent,
    QuizQuestion, Review, StoryContent, TeacherProfile, VerificationStatus, VideoContent,
};
use kids_learning_core::ports::GeneratedStory;
use kids_learning_core::status::EntityKind;
use kids_learning_core::store::Record;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_teachers_handler,
        verify_teacher_handler,
        submit_verification_handler,
        add_review_handler,
        list_courses_handler,
        create_course_handler,
        patch_course_status_handler,
        list_activities_handler,
        create_activity_handler,
        patch_activity_status_handler,
        crate::web::ai::story_handler,
        crate::web::ai::ask_handler,
    ),
    components(
        schemas(
            StatusPatchRequest, ErrorBody, TeacherProfile, Review, VerificationStatus,
            Course, CourseStatus, Lesson, NewCourse, Activity, ActivityStatus,
            ActivityCategory, AgeGroup, ActivityContent, StoryContent, QuizContent,
            QuizQuestion, VideoContent, GameContent, DrawingContent, NewActivity, NewReview,
            StoryRequest, GeneratedStory, AskRequest, AskResponse,
        )
    ),
    tags(
        (name = "Kids Learning API", description = "Catalog and review workflow for teachers, courses, and activities.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Payload Structs
//=========================================================================================

/// Body of every status patch.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusPatchRequest {
    pub new_status: String,
}

/// Turns a malformed JSON body into a 400 with a readable message.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, HandlerError> {
    body.map(|Json(value)| value).map_err(|rejection| {
        warn!("Rejected request body: {}", rejection.body_text());
        error_response(StatusCode::BAD_REQUEST, rejection.body_text())
    })
}

async fn patch_status(
    app_state: &AppState,
    kind: EntityKind,
    id: &str,
    body: Result<Json<StatusPatchRequest>, JsonRejection>,
) -> Result<Record, HandlerError> {
    let request = json_body(body)?;
    app_state
        .catalog
        .patch_status(kind, id, &request.new_status)
        .await
        .map_err(|e| {
            warn!("Status patch on {} {} failed: {}", kind, id, e);
            port_error(e)
        })
}

//=========================================================================================
// Teachers
//=========================================================================================

/// List every teacher profile.
#[utoipa::path(
    get,
    path = "/api/teachers",
    responses(
        (status = 200, description = "All teachers", body = [TeacherProfile]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_teachers_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<TeacherProfile>>, HandlerError> {
    app_state.catalog.list_teachers().await.map(Json).map_err(|e| {
        error!("Failed to list teachers: {:?}", e);
        port_error(e)
    })
}

/// Set a teacher's verification status.
#[utoipa::path(
    patch,
    path = "/api/teachers/{teacher_id}/verify",
    request_body = StatusPatchRequest,
    params(("teacher_id" = String, Path, description = "Teacher id")),
    responses(
        (status = 200, description = "Updated teacher", body = TeacherProfile),
        (status = 400, description = "Status not one of Pending, Verified, Rejected", body = ErrorBody),
        (status = 404, description = "Unknown teacher", body = ErrorBody)
    )
)]
pub async fn verify_teacher_handler(
    State(app_state): State<Arc<AppState>>,
    Path(teacher_id): Path<String>,
    body: Result<Json<StatusPatchRequest>, JsonRejection>,
) -> Result<Json<TeacherProfile>, HandlerError> {
    let record = patch_status(&app_state, EntityKind::Teacher, &teacher_id, body).await?;
    record.into_teacher().map(Json).map_err(port_error)
}

/// Submit verification documents. The teacher goes back to `Pending` for review.
#[utoipa::path(
    post,
    path = "/api/teachers/{teacher_id}/submit-verification",
    request_body(content = serde_json::Value, description = "Verification documents; only logged."),
    params(("teacher_id" = String, Path, description = "Teacher id")),
    responses(
        (status = 200, description = "Teacher now pending review", body = TeacherProfile),
        (status = 404, description = "Unknown teacher", body = ErrorBody)
    )
)]
pub async fn submit_verification_handler(
    State(app_state): State<Arc<AppState>>,
    Path(teacher_id): Path<String>,
    documents: Bytes,
) -> Result<Json<TeacherProfile>, HandlerError> {
    info!(
        "Verification submitted for teacher {} ({} bytes of documents)",
        teacher_id,
        documents.len()
    );
    app_state
        .catalog
        .submit_verification(&teacher_id)
        .await
        .map(Json)
        .map_err(port_error)
}

/// Leave a review for a teacher.
#[utoipa::path(
    post,
    path = "/api/teachers/{teacher_id}/reviews",
    request_body = NewReview,
    params(("teacher_id" = String, Path, description = "Teacher id")),
    responses(
        (status = 201, description = "Teacher with the new review", body = TeacherProfile),
        (status = 400, description = "Rating outside 1 to 5", body = ErrorBody),
        (status = 404, description = "Unknown teacher", body = ErrorBody)
    )
)]
pub async fn add_review_handler(
    State(app_state): State<Arc<AppState>>,
    Path(teacher_id): Path<String>,
    body: Result<Json<NewReview>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let review = json_body(body)?;
    let teacher = app_state
        .catalog
        .add_review(&teacher_id, review)
        .await
        .map_err(port_error)?;
    Ok((StatusCode::CREATED, Json(teacher)))
}

//=========================================================================================
// Courses
//=========================================================================================

/// List every course.
#[utoipa::path(
    get,
    path = "/api/courses",
    responses((status = 200, description = "All courses", body = [Course]))
)]
pub async fn list_courses_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<Course>>, HandlerError> {
    app_state.catalog.list_courses().await.map(Json).map_err(|e| {
        error!("Failed to list courses: {:?}", e);
        port_error(e)
    })
}

/// Submit a new course. It is stored as `Pending`.
#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = NewCourse,
    responses(
        (status = 201, description = "Stored course", body = Course),
        (status = 400, description = "Invalid course", body = ErrorBody)
    )
)]
pub async fn create_course_handler(
    State(app_state): State<Arc<AppState>>,
    body: Result<Json<NewCourse>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let draft = json_body(body)?;
    let course = app_state
        .catalog
        .create_course(draft)
        .await
        .map_err(port_error)?;
    Ok((StatusCode::CREATED, Json(course)))
}

/// Set a course's publication status.
#[utoipa::path(
    patch,
    path = "/api/courses/{course_id}/status",
    request_body = StatusPatchRequest,
    params(("course_id" = String, Path, description = "Course id")),
    responses(
        (status = 200, description = "Updated course", body = Course),
        (status = 400, description = "Status not one of Pending, Active, Rejected", body = ErrorBody),
        (status = 404, description = "Unknown course", body = ErrorBody)
    )
)]
pub async fn patch_course_status_handler(
    State(app_state): State<Arc<AppState>>,
    Path(course_id): Path<String>,
    body: Result<Json<StatusPatchRequest>, JsonRejection>,
) -> Result<Json<Course>, HandlerError> {
    let record = patch_status(&app_state, EntityKind::Course, &course_id, body).await?;
    record.into_course().map(Json).map_err(port_error)
}

//=========================================================================================
// Activities
//=========================================================================================

/// List every activity.
#[utoipa::path(
    get,
    path = "/api/activities",
    responses((status = 200, description = "All activities", body = [Activity]))
)]
pub async fn list_activities_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<Activity>>, HandlerError> {
    app_state.catalog.list_activities().await.map(Json).map_err(|e| {
        error!("Failed to list activities: {:?}", e);
        port_error(e)
    })
}

/// Submit a new activity. It is stored as `Pending`.
#[utoipa::path(
    post,
    path = "/api/activities",
    request_body = NewActivity,
    responses(
        (status = 201, description = "Stored activity", body = Activity),
        (status = 400, description = "Invalid activity", body = ErrorBody)
    )
)]
pub async fn create_activity_handler(
    State(app_state): State<Arc<AppState>>,
    body: Result<Json<NewActivity>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let draft = json_body(body)?;
    let activity = app_state
        .catalog
        .create_activity(draft)
        .await
        .map_err(port_error)?;
    Ok((StatusCode::CREATED, Json(activity)))
}

/// Set an activity's approval status.
#[utoipa::path(
    patch,
    path = "/api/activities/{activity_id}/status",
    request_body = StatusPatchRequest,
    params(("activity_id" = String, Path, description = "Activity id")),
    responses(
        (status = 200, description = "Updated activity", body = Activity),
        (status = 400, description = "Status not one of Pending, Approved, Rejected", body = ErrorBody),
        (status = 404, description = "Unknown activity", body = ErrorBody)
    )
)]
pub async fn patch_activity_status_handler(
    State(app_state): State<Arc<AppState>>,
    Path(activity_id): Path<String>,
    body: Result<Json<StatusPatchRequest>, JsonRejection>,
) -> Result<Json<Activity>, HandlerError> {
    let record = patch_status(&app_state, EntityKind::Activity, &activity_id, body).await?;
    record.into_activity().map(Json).map_err(port_error)
}

pub async fn health_handler() -> &'static str {
    "ok"
}
