use std::fmt;

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const API_VERSION_TAG: &str = "v1";

/// JSON body shared by every endpoint.
///
/// `data` is always emitted (`null` when absent). `error` is only emitted by
/// endpoints that flag failures in the body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Envelope<T> {
    pub message: String,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<bool>,
}

impl<T> Envelope<T> {
    /// A body with a message and no data.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
            error: None,
        }
    }

    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }

    pub fn flagged(mut self, error: bool) -> Self {
        self.error = Some(error);
        self
    }
}

/// Errors a handler ran into while serving a request.
///
/// Handlers attach them to the response as an extension; the request logging
/// middleware reads them back. They never reach the response body.
#[derive(Debug, Clone, Default)]
pub struct RequestErrors(Vec<String>);

impl RequestErrors {
    /// Records `err` together with its chain of causes.
    pub fn push(&mut self, err: &(dyn std::error::Error + 'static)) {
        let chain: Vec<String> = std::iter::successors(Some(err), |e| e.source())
            .map(|e| e.to_string())
            .collect();
        self.0.push(chain.join(": "));
    }

    pub fn push_message(&mut self, msg: impl Into<String>) {
        self.0.push(msg.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for RequestErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join("; "))
    }
}

/// An [`Envelope`] with the status it is sent with.
pub struct JsonResponse<T: Serialize> {
    status: StatusCode,
    envelope: Envelope<T>,
    errors: RequestErrors,
}

impl<T: Serialize> JsonResponse<T> {
    pub fn new(status: StatusCode, envelope: Envelope<T>) -> Self {
        Self {
            status,
            envelope,
            errors: RequestErrors::default(),
        }
    }

    /// Records the error that produced this response for the request log.
    pub fn with_error(mut self, err: &(dyn std::error::Error + 'static)) -> Self {
        self.errors.push(err);
        self
    }
}

impl<T: Serialize> IntoResponse for JsonResponse<T> {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.envelope)).into_response();
        if !self.errors.is_empty() {
            response.extensions_mut().insert(self.errors);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn test_envelope_always_emits_data() {
        let body: Envelope<u32> = Envelope::message("failed to get task: not found");
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"message": "failed to get task: not found", "data": null})
        );

        let body = Envelope::<u32>::message("Profile not found").flagged(true);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"message": "Profile not found", "data": null, "error": true})
        );
    }

    #[test]
    fn test_request_errors_keep_cause_chain() {
        let inner = std::io::Error::other("disk full");
        let outer = crate::error::StorageError::internal("exec", inner);

        let mut errors = RequestErrors::default();
        errors.push(&outer);

        let logged: Vec<&str> = errors.iter().collect();
        assert_eq!(
            logged,
            vec!["storage: internal storage error: exec: disk full"]
        );
    }

    #[tokio::test]
    async fn test_json_response_sets_status_content_type_and_extension() {
        let err = std::io::Error::other("boom");
        let response = JsonResponse::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            Envelope::<u32>::message("internal error"),
        )
        .with_error(&err)
        .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert!(response.extensions().get::<RequestErrors>().is_some());

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "internal error");
        assert!(body["data"].is_null());
    }
}
