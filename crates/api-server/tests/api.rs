use api_server::config::TaskStorage;
use api_server::factory::{ApiServiceConfig, create_api_service, load_sql_migrations};
use api_server::router::initiate_api_router;
use axum::{Router, body::Body};
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use shared::test_utils::repository::setup_in_memory_database;
use tower::ServiceExt;

async fn app_with(config: ApiServiceConfig) -> (libsql::Database, Router) {
    shared::setup_test!();
    let (db, conn) = setup_in_memory_database(vec![load_sql_migrations()])
        .await
        .unwrap();
    let api_service = create_api_service(conn, &config).unwrap();
    (db, initiate_api_router(api_service).unwrap())
}

async fn app() -> (libsql::Database, Router) {
    app_with(ApiServiceConfig::default()).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, body)
}

fn post_task(body: &str) -> Request<Body> {
    Request::post("/tasks")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_task(id: &str) -> Request<Body> {
    Request::get(format!("/tasks/{id}"))
        .body(Body::empty())
        .unwrap()
}

fn activate_profile(user_id: &str) -> Request<Body> {
    Request::post("/profiles")
        .header("User-Id", user_id)
        .body(Body::empty())
        .unwrap()
}

fn get_profile(user_id: &str) -> Request<Body> {
    Request::get("/profiles")
        .header("User-Id", user_id)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_ping() {
    let (_db, app) = app().await;
    let response = app
        .oneshot(Request::get("/ping").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"pong");
}

#[tokio::test]
async fn test_get_missing_task() {
    let (_db, app) = app().await;
    let (status, body) = send(&app, get_task("missing")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"message": "failed to get task: not found", "data": null})
    );
}

#[tokio::test]
async fn test_create_then_get_task() {
    for task_storage in [TaskStorage::Sqlite, TaskStorage::Memory] {
        let (_db, app) = app_with(ApiServiceConfig {
            task_storage,
            ..Default::default()
        })
        .await;

        let (status, created) = send(
            &app,
            post_task(r#"{"title":"write docs","description":"api docs","completed":false}"#),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["message"], "succeed to create task");
        let id = created["data"]["id"].as_str().unwrap().to_string();
        assert!(!id.is_empty());

        let (status, fetched) = send(&app, get_task(&id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            fetched,
            json!({
                "message": "succeed to get task",
                "data": {
                    "id": id,
                    "title": "write docs",
                    "description": "api docs",
                    "completed": false
                }
            })
        );
    }
}

#[tokio::test]
async fn test_create_invalid_task() {
    let (_db, app) = app().await;

    let (status, body) = send(&app, post_task(r#"{"completed":false}"#)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body,
        json!({"message": "failed to create task: invalid task", "data": null})
    );

    let long_title = "x".repeat(51);
    let (status, _) = send(
        &app,
        post_task(&format!(r#"{{"title":"{long_title}","completed":true}}"#)),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_create_task_with_malformed_body() {
    let (_db, app) = app().await;
    let (status, body) = send(&app, post_task("{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"message": "failed to create task: invalid request", "data": null})
    );
}

#[tokio::test]
async fn test_create_task_without_content_type() {
    let (_db, app) = app().await;
    let request = Request::post("/tasks")
        .body(Body::from(r#"{"title":"plain","completed":true}"#))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, get_task(&id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "plain");
    assert_eq!(body["data"]["completed"], true);
}

#[tokio::test]
async fn test_activate_profile_once() {
    let (_db, app) = app().await;

    let (status, body) = send(&app, activate_profile("u-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"message": "Success", "data": null, "error": false})
    );

    let (status, body) = send(&app, activate_profile("u-1")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body,
        json!({"message": "Profile not unique", "data": null, "error": true})
    );
}

#[tokio::test]
async fn test_activate_profile_without_user_id() {
    let (_db, app) = app().await;
    let (status, body) = send(
        &app,
        Request::post("/profiles").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body,
        json!({"message": "Invalid profile", "data": null, "error": true})
    );
}

#[tokio::test]
async fn test_get_profile() {
    let (_db, app) = app().await;

    let (status, body) = send(&app, get_profile("u-1")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({"message": "Profile not found", "data": null, "error": true})
    );

    send(&app, activate_profile("u-1")).await;

    let (status, body) = send(&app, get_profile("u-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Success");
    assert_eq!(body["error"], false);
    assert_eq!(body["data"]["user_id"], "u-1");
    assert!(body["data"].get("id").is_none());
}

#[tokio::test]
async fn test_get_profile_by_user_id_lookup() {
    let (_db, app) = app_with(ApiServiceConfig {
        profile_lookup: profiles::ProfileLookup::UserId,
        ..Default::default()
    })
    .await;

    send(&app, activate_profile("u-2")).await;

    let (status, body) = send(&app, get_profile("u-2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user_id"], "u-2");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (_db, app) = app().await;
    let (status, body) = send(
        &app,
        Request::get("/openapi.json").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/tasks/{id}"].is_object());
    assert!(body["paths"]["/profiles"].is_object());
}
