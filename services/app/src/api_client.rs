//! services/app/src/api_client.rs
//!
//! The client's view of the backend. Every call is all-or-nothing: a non-2xx
//! response becomes a single `ClientError::Api` carrying the server's message,
//! falling back to the HTTP status text when the body has none.

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use kids_learning_core::domain::{
    Activity, AgeGroup, Course, NewActivity, NewCourse, NewReview, TeacherProfile,
};
use kids_learning_core::ports::GeneratedStory;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ClientError;

//=========================================================================================
// Transport Port
//=========================================================================================

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Moves one request to the backend and brings back its raw response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError>;
}

//=========================================================================================
// The API Client
//=========================================================================================

/// Everything except RFC 3986 unreserved characters is escaped in a segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Escapes an id for use as one path segment.
fn segment(id: &str) -> String {
    utf8_percent_encode(id, SEGMENT).to_string()
}

#[derive(Deserialize)]
struct AskResponse {
    answer: String,
}

pub struct ApiClient<T: Transport> {
    transport: T,
}

/// Pulls a human-readable message out of an error body.
fn error_message(status: u16, body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .or_else(|| value.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| {
            StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("Request failed")
                .to_string()
        })
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    async fn request<R: DeserializeOwned>(
        &self,
        method: Method,
        path: String,
        body: Option<Value>,
    ) -> Result<R, ClientError> {
        debug!("{} {}", method, path);
        let response = self
            .transport
            .send(ApiRequest { method, path, body })
            .await?;
        if !(200..300).contains(&response.status) {
            return Err(ClientError::Api {
                status: response.status,
                message: error_message(response.status, &response.body),
            });
        }
        serde_json::from_slice(&response.body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    fn encode<S: serde::Serialize>(value: &S) -> Result<Value, ClientError> {
        serde_json::to_value(value).map_err(|e| ClientError::Decode(e.to_string()))
    }

    // --- Collections ---

    pub async fn get_teachers(&self) -> Result<Vec<TeacherProfile>, ClientError> {
        self.request(Method::GET, "/api/teachers".to_string(), None).await
    }

    pub async fn get_courses(&self) -> Result<Vec<Course>, ClientError> {
        self.request(Method::GET, "/api/courses".to_string(), None).await
    }

    pub async fn get_activities(&self) -> Result<Vec<Activity>, ClientError> {
        self.request(Method::GET, "/api/activities".to_string(), None).await
    }

    // --- Status workflow ---

    pub async fn update_teacher_verification(
        &self,
        teacher_id: &str,
        new_status: &str,
    ) -> Result<TeacherProfile, ClientError> {
        self.request(
            Method::PATCH,
            format!("/api/teachers/{}/verify", segment(teacher_id)),
            Some(json!({ "newStatus": new_status })),
        )
        .await
    }

    pub async fn update_course_status(
        &self,
        course_id: &str,
        new_status: &str,
    ) -> Result<Course, ClientError> {
        self.request(
            Method::PATCH,
            format!("/api/courses/{}/status", segment(course_id)),
            Some(json!({ "newStatus": new_status })),
        )
        .await
    }

    pub async fn update_activity_status(
        &self,
        activity_id: &str,
        new_status: &str,
    ) -> Result<Activity, ClientError> {
        self.request(
            Method::PATCH,
            format!("/api/activities/{}/status", segment(activity_id)),
            Some(json!({ "newStatus": new_status })),
        )
        .await
    }

    pub async fn submit_verification(
        &self,
        teacher_id: &str,
        documents: Value,
    ) -> Result<TeacherProfile, ClientError> {
        self.request(
            Method::POST,
            format!("/api/teachers/{}/submit-verification", segment(teacher_id)),
            Some(documents),
        )
        .await
    }

    // --- Submissions ---

    pub async fn create_course(&self, draft: &NewCourse) -> Result<Course, ClientError> {
        self.request(Method::POST, "/api/courses".to_string(), Some(Self::encode(draft)?))
            .await
    }

    pub async fn create_activity(&self, draft: &NewActivity) -> Result<Activity, ClientError> {
        self.request(Method::POST, "/api/activities".to_string(), Some(Self::encode(draft)?))
            .await
    }

    pub async fn add_review(
        &self,
        teacher_id: &str,
        review: &NewReview,
    ) -> Result<TeacherProfile, ClientError> {
        self.request(
            Method::POST,
            format!("/api/teachers/{}/reviews", segment(teacher_id)),
            Some(Self::encode(review)?),
        )
        .await
    }

    // --- Story passthrough ---

    pub async fn generate_story(
        &self,
        prompt: &str,
        age_group: AgeGroup,
    ) -> Result<GeneratedStory, ClientError> {
        self.request(
            Method::POST,
            "/api/ai/story".to_string(),
            Some(json!({ "prompt": prompt, "ageGroup": age_group })),
        )
        .await
    }

    pub async fn ask(&self, question: &str, context: Option<&str>) -> Result<String, ClientError> {
        let response: AskResponse = self
            .request(
                Method::POST,
                "/api/ai/ask".to_string(),
                Some(json!({ "question": question, "context": context })),
            )
            .await?;
        Ok(response.answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Replies with a canned status and body, remembering the last request.
    struct CannedTransport {
        status: u16,
        body: &'static str,
        last: Mutex<Option<ApiRequest>>,
    }

    #[async_trait]
    impl Transport for CannedTransport {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
            *self.last.lock().unwrap() = Some(request);
            Ok(ApiResponse {
                status: self.status,
                body: self.body.as_bytes().to_vec(),
            })
        }
    }

    fn client(status: u16, body: &'static str) -> ApiClient<CannedTransport> {
        ApiClient::new(CannedTransport {
            status,
            body,
            last: Mutex::new(None),
        })
    }

    #[tokio::test]
    async fn error_body_message_is_surfaced() {
        let api = client(400, r#"{"message":"Invalid status 'Deleted' for course"}"#);
        let err = api.update_course_status("c1", "Deleted").await.unwrap_err();
        assert_eq!(
            err,
            ClientError::Api {
                status: 400,
                message: "Invalid status 'Deleted' for course".to_string()
            }
        );
        let last = api.transport.last.lock().unwrap().clone().unwrap();
        assert_eq!(last.method, Method::PATCH);
        assert_eq!(last.path, "/api/courses/c1/status");
        assert_eq!(last.body.unwrap()["newStatus"], "Deleted");
    }

    #[tokio::test]
    async fn ids_are_escaped_as_a_single_segment() {
        let api = client(200, "{}");
        let _ = api.update_activity_status("act 1/../x?y#z", "Approved").await;
        let last = api.transport.last.lock().unwrap().clone().unwrap();
        assert_eq!(last.path, "/api/activities/act%201%2F..%2Fx%3Fy%23z/status");

        let _ = api.submit_verification("teacher_amira", json!({})).await;
        let last = api.transport.last.lock().unwrap().clone().unwrap();
        assert_eq!(last.path, "/api/teachers/teacher_amira/submit-verification");
    }

    #[tokio::test]
    async fn status_text_is_the_fallback_message() {
        let api = client(404, "not json at all");
        let err = api.get_courses().await.unwrap_err();
        assert_eq!(
            err,
            ClientError::Api {
                status: 404,
                message: "Not Found".to_string()
            }
        );
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_decode_error() {
        let api = client(200, "{}");
        assert!(matches!(api.get_teachers().await, Err(ClientError::Decode(_))));
    }
}
