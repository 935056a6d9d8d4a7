//! One log line per request, plus the panic fallback response.

use std::any::Any;
use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use shared::adapters::openapi::{Envelope, JsonResponse, RequestErrors};
use tracing::{error, info, warn};

/// Logs method, path, status, client address and the errors a handler
/// recorded through [`JsonResponse::with_error`].
///
/// 5xx responses log at error level, 4xx at warn, everything else at info.
pub async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "-".to_string());
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    let errors = response
        .extensions()
        .get::<RequestErrors>()
        .map(ToString::to_string)
        .unwrap_or_else(|| "[]".to_string());

    if status.is_server_error() {
        error!(%method, %path, status = status.as_u16(), %remote, %errors, elapsed_ms, "request failed");
    } else if status.is_client_error() {
        warn!(%method, %path, status = status.as_u16(), %remote, %errors, elapsed_ms, "request rejected");
    } else {
        info!(%method, %path, status = status.as_u16(), %remote, elapsed_ms, "request served");
    }

    response
}

/// Response sent when a handler panics.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    let mut response = JsonResponse::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        Envelope::<()>::message("internal error"),
    )
    .into_response();
    let mut errors = RequestErrors::default();
    errors.push_message(format!("handler panicked: {detail}"));
    response.extensions_mut().insert(errors);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, middleware, routing::get};
    use http::Request as HttpRequest;
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use tower_http::catch_panic::CatchPanicLayer;

    async fn failing() -> JsonResponse<()> {
        let err = std::io::Error::other("disk full");
        JsonResponse::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            Envelope::message("internal error"),
        )
        .with_error(&err)
    }

    async fn panicking() -> &'static str {
        panic!("boom")
    }

    fn app() -> Router {
        Router::new()
            .route("/failing", get(failing))
            .route("/panicking", get(panicking))
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(middleware::from_fn(log_request))
    }

    #[tokio::test]
    async fn test_logging_keeps_response_intact() {
        let response = app()
            .oneshot(HttpRequest::get("/failing").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let errors = response.extensions().get::<RequestErrors>().unwrap();
        assert_eq!(errors.to_string(), "[disk full]");

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"message": "internal error", "data": null})
        );
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_error() {
        let response = app()
            .oneshot(HttpRequest::get("/panicking").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let errors = response.extensions().get::<RequestErrors>().unwrap();
        assert_eq!(errors.to_string(), "[handler panicked: boom]");
    }
}
