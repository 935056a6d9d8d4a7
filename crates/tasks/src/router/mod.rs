//! Task HTTP endpoints.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use http::StatusCode;
use shared::{
    adapters::openapi::{API_VERSION_TAG, Envelope, JsonResponse},
    error::StorageErrorKind,
};
use tracing::trace;
use utoipa::openapi::OpenApi as OpenApiDoc;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::{
    logic::{CreateTaskRequest, Task},
    service::TaskService,
};

pub const SERVICE_ROUTE_KEY: &str = "tasks";

pub fn create_router() -> OpenApiRouter<Arc<TaskService>> {
    OpenApiRouter::new()
        .routes(routes!(route_get_task))
        .routes(routes!(route_create_task))
}

pub fn get_openapi_spec() -> OpenApiDoc {
    let (_, spec) = create_router().split_for_parts();
    spec
}

/// Status and message for a failed lookup.
fn get_task_failure(kind: StorageErrorKind) -> (StatusCode, &'static str) {
    match kind {
        StorageErrorKind::NotFound => (StatusCode::NOT_FOUND, "failed to get task: not found"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal error"),
    }
}

/// Status and message for a failed create.
fn create_task_failure(kind: StorageErrorKind) -> (StatusCode, &'static str) {
    match kind {
        StorageErrorKind::Invalid => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "failed to create task: invalid task",
        ),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal error"),
    }
}

#[utoipa::path(
    get,
    path = "/tasks/{id}",
    tags = [SERVICE_ROUTE_KEY, API_VERSION_TAG],
    params(
        ("id" = String, Path, description = "Task id"),
    ),
    responses(
        (status = 200, description = "Task found", body = Envelope<Task>),
        (status = 404, description = "Task not found", body = Envelope<Task>),
        (status = 500, description = "Internal Server Error", body = Envelope<Task>),
    ),
    summary = "Get task",
    description = "Get a task by its id",
    operation_id = "get-task",
)]
async fn route_get_task(
    State(ctx): State<Arc<TaskService>>,
    Path(id): Path<String>,
) -> JsonResponse<Task> {
    trace!(task_id = %id, "Getting task");
    let res = ctx.repository.get_task(&id).await;
    trace!(success = res.is_ok(), "Getting task completed");

    match res {
        Ok(task) => JsonResponse::new(
            StatusCode::OK,
            Envelope::with_data("succeed to get task", task),
        ),
        Err(e) => {
            let (status, message) = get_task_failure(e.kind());
            JsonResponse::new(status, Envelope::message(message)).with_error(&e)
        }
    }
}

#[utoipa::path(
    post,
    path = "/tasks",
    tags = [SERVICE_ROUTE_KEY, API_VERSION_TAG],
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = Envelope<Task>),
        (status = 400, description = "Undecodable body", body = Envelope<Task>),
        (status = 422, description = "Task failed validation", body = Envelope<Task>),
        (status = 500, description = "Internal Server Error", body = Envelope<Task>),
    ),
    summary = "Create task",
    description = "Create a task; the server assigns its id",
    operation_id = "create-task",
)]
async fn route_create_task(
    State(ctx): State<Arc<TaskService>>,
    body: Bytes,
) -> JsonResponse<Task> {
    // The body is decoded whatever the Content-Type header says.
    let request = match serde_json::from_slice::<CreateTaskRequest>(&body) {
        Ok(request) => request,
        Err(e) => {
            return JsonResponse::new(
                StatusCode::BAD_REQUEST,
                Envelope::message("failed to create task: invalid request"),
            )
            .with_error(&e);
        }
    };

    trace!("Creating task");
    let res = ctx.repository.save_task(Task::from(request)).await;
    trace!(success = res.is_ok(), "Creating task completed");

    match res {
        Ok(task) => JsonResponse::new(
            StatusCode::CREATED,
            Envelope::with_data("succeed to create task", task),
        ),
        Err(e) => {
            let (status, message) = create_task_failure(e.kind());
            JsonResponse::new(status, Envelope::message(message)).with_error(&e)
        }
    }
}
