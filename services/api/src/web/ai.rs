//! services/api/src/web/ai.rs
//!
//! Passthrough endpoints to the generative story/Q&A model.

use crate::error::{error_response, port_error, ErrorBody, HandlerError};
use crate::web::rest::json_body;
use crate::web::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use kids_learning_core::domain::AgeGroup;
use kids_learning_core::ports::{GeneratedStory, StoryGenerationService};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

const MAX_PROMPT_CHARS: usize = 500;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoryRequest {
    pub prompt: String,
    pub age_group: AgeGroup,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AskResponse {
    pub answer: String,
}

fn story_service(app_state: &AppState) -> Result<&Arc<dyn StoryGenerationService>, HandlerError> {
    app_state.story_adapter.as_ref().ok_or_else(|| {
        error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Story generation is not configured on this server",
        )
    })
}

fn checked_text<'a>(field: &str, text: &'a str) -> Result<&'a str, HandlerError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            format!("{} must not be empty", field),
        ));
    }
    if text.chars().count() > MAX_PROMPT_CHARS {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            format!("{} must be at most {} characters", field, MAX_PROMPT_CHARS),
        ));
    }
    Ok(text)
}

/// Generate a short story for a kid.
#[utoipa::path(
    post,
    path = "/api/ai/story",
    request_body = StoryRequest,
    responses(
        (status = 200, description = "Generated story", body = GeneratedStory),
        (status = 400, description = "Malformed body, or empty or overlong prompt", body = ErrorBody),
        (status = 503, description = "No story model configured", body = ErrorBody)
    )
)]
pub async fn story_handler(
    State(app_state): State<Arc<AppState>>,
    body: Result<Json<StoryRequest>, JsonRejection>,
) -> Result<Json<GeneratedStory>, HandlerError> {
    let request = json_body(body)?;
    let service = story_service(&app_state)?;
    let prompt = checked_text("prompt", &request.prompt)?;
    service
        .generate_story(prompt, request.age_group)
        .await
        .map(Json)
        .map_err(|e| {
            error!("Story generation failed: {:?}", e);
            port_error(e)
        })
}

/// Answer a kid's question.
#[utoipa::path(
    post,
    path = "/api/ai/ask",
    request_body = AskRequest,
    responses(
        (status = 200, description = "Answer", body = AskResponse),
        (status = 400, description = "Malformed body, or empty or overlong question", body = ErrorBody),
        (status = 503, description = "No story model configured", body = ErrorBody)
    )
)]
pub async fn ask_handler(
    State(app_state): State<Arc<AppState>>,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, HandlerError> {
    let request = json_body(body)?;
    let service = story_service(&app_state)?;
    let question = checked_text("question", &request.question)?;
    let answer = service
        .answer_question(question, request.context.as_deref())
        .await
        .map_err(|e| {
            error!("Question answering failed: {:?}", e);
            port_error(e)
        })?;
    Ok(Json(AskResponse { answer }))
}
