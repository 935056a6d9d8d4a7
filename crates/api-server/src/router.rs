use axum::{Router, middleware, routing::get};
use http::header::CONTENT_TYPE;
use shared::adapters::openapi::API_VERSION_TAG;
use shared::error::CommonError;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::trace;
use utoipa::openapi::tag::TagBuilder;
use utoipa::openapi::{Info, OpenApi};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::ApiService;
use crate::request_log::{log_request, panic_response};

pub const HEALTH_ROUTE_KEY: &str = "health";
pub const OPENAPI_PATH: &str = "/openapi.json";

pub fn create_health_router() -> OpenApiRouter {
    OpenApiRouter::new().routes(routes!(route_ping))
}

#[utoipa::path(
    get,
    path = "/ping",
    tags = [HEALTH_ROUTE_KEY, API_VERSION_TAG],
    responses(
        (status = 200, description = "Server is up", body = String, content_type = "text/plain"),
    ),
    summary = "Ping",
    description = "Liveness probe",
    operation_id = "ping",
)]
async fn route_ping() -> &'static str {
    trace!("Ping");
    "pong"
}

pub fn initiate_api_router(api_service: ApiService) -> Result<Router, CommonError> {
    let mut router = Router::new();

    // health router
    let (health_router, _) = create_health_router().split_for_parts();
    router = router.merge(health_router);

    // task router
    let (task_router, _) = tasks::create_router().split_for_parts();
    let task_router = task_router.with_state(api_service.task_service);
    router = router.merge(task_router);

    // profile router
    let (profile_router, _) = profiles::create_router().split_for_parts();
    let profile_router = profile_router.with_state(api_service.profile_service);
    router = router.merge(profile_router);

    let openapi_json = generate_openapi_spec().to_json()?;
    router = router.route(
        OPENAPI_PATH,
        get(move || {
            let body = openapi_json.clone();
            async move { ([(CONTENT_TYPE, "application/json")], body) }
        }),
    );

    let router = router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn(log_request));

    Ok(router)
}

pub fn generate_openapi_spec() -> OpenApi {
    let (_, mut spec) = create_health_router().split_for_parts();
    spec.merge(tasks::router::get_openapi_spec());
    spec.merge(profiles::router::get_openapi_spec());

    let mut info = Info::new("task-profile-api", "v1");
    info.description = Some("Task and profile management API".to_string());
    spec.info = info;

    spec.tags = Some(vec![
        TagBuilder::new()
            .name(HEALTH_ROUTE_KEY)
            .description(Some("Liveness endpoints"))
            .build(),
        TagBuilder::new()
            .name(tasks::router::SERVICE_ROUTE_KEY)
            .description(Some("Task endpoints for creating tasks and reading them back"))
            .build(),
        TagBuilder::new()
            .name(profiles::router::SERVICE_ROUTE_KEY)
            .description(Some("Profile endpoints keyed by the caller's User-Id header"))
            .build(),
    ]);

    spec
}
