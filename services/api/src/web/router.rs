//! services/api/src/web/router.rs
//!
//! Builds the full HTTP application: API routes, CORS, and Swagger UI.

use crate::error::ApiError;
use crate::web::{ai, rest, state::AppState};
use axum::{
    http::{header::{ACCEPT, CONTENT_TYPE}, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn cors_layer(origin: &str) -> Result<CorsLayer, ApiError> {
    let origin = origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("Invalid CORS origin '{}': {}", origin, e))
    })?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]))
}

/// The `/api` routes alone, with state applied.
pub fn api_routes(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/teachers", get(rest::list_teachers_handler))
        .route("/api/teachers/{teacher_id}/verify", patch(rest::verify_teacher_handler))
        .route(
            "/api/teachers/{teacher_id}/submit-verification",
            post(rest::submit_verification_handler),
        )
        .route("/api/teachers/{teacher_id}/reviews", post(rest::add_review_handler))
        .route(
            "/api/courses",
            get(rest::list_courses_handler).post(rest::create_course_handler),
        )
        .route("/api/courses/{course_id}/status", patch(rest::patch_course_status_handler))
        .route(
            "/api/activities",
            get(rest::list_activities_handler).post(rest::create_activity_handler),
        )
        .route(
            "/api/activities/{activity_id}/status",
            patch(rest::patch_activity_status_handler),
        )
        .route("/api/ai/story", post(ai::story_handler))
        .route("/api/ai/ask", post(ai::ask_handler))
        .route("/health", get(rest::health_handler))
        .with_state(app_state)
}

/// The complete application served by the `api` binary.
pub fn build_router(app_state: Arc<AppState>) -> Result<Router, ApiError> {
    let cors = cors_layer(&app_state.config.cors_origin)?;
    Ok(Router::new()
        .merge(api_routes(app_state).layer(cors))
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", rest::ApiDoc::openapi()),
        ))
}
