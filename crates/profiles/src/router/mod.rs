//! Profile HTTP endpoints.

mod mapping;

use std::sync::Arc;

use axum::extract::State;
use http::{HeaderMap, StatusCode};
use shared::{
    adapters::openapi::{API_VERSION_TAG, Envelope, JsonResponse},
    error::StorageErrorKind,
};
use tracing::trace;
use utoipa::openapi::OpenApi as OpenApiDoc;
use utoipa_axum::{router::OpenApiRouter, routes};

pub use mapping::{MappedProfile, user_id_from_headers};

use crate::{
    logic::{Profile, ProfileDto},
    service::ProfileService,
};

pub const SERVICE_ROUTE_KEY: &str = "profiles";

pub fn create_router() -> OpenApiRouter<Arc<ProfileService>> {
    OpenApiRouter::new().routes(routes!(route_get_profile, route_activate_profile))
}

pub fn get_openapi_spec() -> OpenApiDoc {
    let (_, spec) = create_router().split_for_parts();
    spec
}

fn get_profile_failure(kind: StorageErrorKind) -> (StatusCode, &'static str) {
    match kind {
        StorageErrorKind::NotFound => (StatusCode::NOT_FOUND, "Profile not found"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
    }
}

fn activate_profile_failure(kind: StorageErrorKind) -> (StatusCode, &'static str) {
    match kind {
        StorageErrorKind::Invalid => (StatusCode::UNPROCESSABLE_ENTITY, "Invalid profile"),
        StorageErrorKind::NotUnique => (StatusCode::CONFLICT, "Profile not unique"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
    }
}

#[utoipa::path(
    get,
    path = "/profiles",
    tags = [SERVICE_ROUTE_KEY, API_VERSION_TAG],
    params(
        ("User-Id" = String, Header, description = "Id of the authenticated user"),
    ),
    responses(
        (status = 200, description = "Profile of the caller", body = Envelope<ProfileDto>),
        (status = 401, description = "No profile for the user", body = Envelope<ProfileDto>),
        (status = 404, description = "Profile not found", body = Envelope<ProfileDto>),
        (status = 500, description = "Internal Server Error", body = Envelope<ProfileDto>),
    ),
    summary = "Get profile",
    description = "Get the profile of the user identified by the User-Id header",
    operation_id = "get-profile",
)]
async fn route_get_profile(
    State(ctx): State<Arc<ProfileService>>,
    profile: MappedProfile,
) -> JsonResponse<ProfileDto> {
    trace!(profile_id = %profile.profile_id.as_str(), "Getting profile");
    let res = ctx.repository.get_profile(profile.key(ctx.lookup)).await;
    trace!(success = res.is_ok(), "Getting profile completed");

    match res {
        Ok(profile) => JsonResponse::new(
            StatusCode::OK,
            Envelope::with_data("Success", ProfileDto::from(profile)).flagged(false),
        ),
        Err(e) => {
            let (status, message) = get_profile_failure(e.kind());
            JsonResponse::new(status, Envelope::message(message).flagged(true)).with_error(&e)
        }
    }
}

#[utoipa::path(
    post,
    path = "/profiles",
    tags = [SERVICE_ROUTE_KEY, API_VERSION_TAG],
    params(
        ("User-Id" = String, Header, description = "Id of the authenticated user"),
    ),
    responses(
        (status = 200, description = "Profile activated", body = Envelope<ProfileDto>),
        (status = 409, description = "A profile already exists for the user", body = Envelope<ProfileDto>),
        (status = 422, description = "Profile failed validation", body = Envelope<ProfileDto>),
        (status = 500, description = "Internal Server Error", body = Envelope<ProfileDto>),
    ),
    summary = "Activate profile",
    description = "Create the profile of the user identified by the User-Id header",
    operation_id = "activate-profile",
)]
async fn route_activate_profile(
    State(ctx): State<Arc<ProfileService>>,
    headers: HeaderMap,
) -> JsonResponse<ProfileDto> {
    let profile = Profile {
        id: Some(ctx.id_generator.generate()),
        user_id: Some(user_id_from_headers(&headers)),
        ..Default::default()
    };

    trace!(profile_id = ?profile.id, "Activating profile");
    let res = ctx.repository.activate_profile(profile).await;
    trace!(success = res.is_ok(), "Activating profile completed");

    match res {
        Ok(_) => JsonResponse::new(StatusCode::OK, Envelope::message("Success").flagged(false)),
        Err(e) => {
            let (status, message) = activate_profile_failure(e.kind());
            JsonResponse::new(status, Envelope::message(message).flagged(true)).with_error(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::ProfileId;
    use crate::repository::{
        MapperError, MockProfileMapperLike, MockProfileRepositoryLike, ProfileLookup,
    };
    use crate::service::ProfileServiceParams;
    use axum::{Router, body::Body};
    use http::Request;
    use http_body_util::BodyExt;
    use shared::error::StorageError;
    use shared::test_utils::helpers::SequenceIdGenerator;
    use shared::validation::ValidationError;
    use tower::ServiceExt;

    fn app_with_lookup(
        repo: MockProfileRepositoryLike,
        mapper: MockProfileMapperLike,
        lookup: ProfileLookup,
    ) -> Router {
        let service = ProfileService::new(ProfileServiceParams {
            repository: Box::new(repo),
            mapper: Box::new(mapper),
            id_generator: Arc::new(SequenceIdGenerator::new("p")),
            lookup,
        });
        let (router, _) = create_router().split_for_parts();
        router.with_state(Arc::new(service))
    }

    fn app(repo: MockProfileRepositoryLike, mapper: MockProfileMapperLike) -> Router {
        app_with_lookup(repo, mapper, ProfileLookup::Id)
    }

    fn mapper_to(profile_id: &'static str) -> MockProfileMapperLike {
        let mut mapper = MockProfileMapperLike::new();
        mapper
            .expect_map_profile()
            .returning(move |_| Ok(ProfileId(profile_id.to_string())));
        mapper
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        assert_eq!(
            response.headers().get(http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get_profile(user_id: &str) -> Request<Body> {
        Request::get("/profiles")
            .header("User-Id", user_id)
            .body(Body::empty())
            .unwrap()
    }

    fn activate(user_id: &str) -> Request<Body> {
        Request::post("/profiles")
            .header("User-Id", user_id)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_profile_success() {
        let mut repo = MockProfileRepositoryLike::new();
        repo.expect_get_profile()
            .withf(|key| key == "p-1")
            .returning(|key| {
                Ok(Profile {
                    id: Some(key.to_string()),
                    user_id: Some("u-1".to_string()),
                    name: Some("Ada".to_string()),
                    ..Default::default()
                })
            });

        let (status, body) = send(app(repo, mapper_to("p-1")), get_profile("u-1")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({
                "message": "Success",
                "data": {"user_id": "u-1", "name": "Ada", "email": null, "phone": null, "address": null},
                "error": false
            })
        );
    }

    #[tokio::test]
    async fn test_get_profile_by_user_id_lookup() {
        let mut repo = MockProfileRepositoryLike::new();
        repo.expect_get_profile()
            .withf(|key| key == "u-1")
            .returning(|key| {
                Ok(Profile {
                    id: Some("p-1".to_string()),
                    user_id: Some(key.to_string()),
                    ..Default::default()
                })
            });

        let (status, body) = send(
            app_with_lookup(repo, mapper_to("p-1"), ProfileLookup::UserId),
            get_profile("u-1"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["user_id"], "u-1");
    }

    #[tokio::test]
    async fn test_get_profile_unknown_user_is_unauthorized() {
        let mut repo = MockProfileRepositoryLike::new();
        repo.expect_get_profile().never();
        let mut mapper = MockProfileMapperLike::new();
        mapper.expect_map_profile().returning(|user_id| {
            Err(MapperError::NotFound {
                user_id: user_id.to_string(),
            })
        });

        let (status, body) = send(app(repo, mapper), get_profile("ghost")).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body,
            serde_json::json!({"message": "Profile not found", "data": null, "error": true})
        );
    }

    #[tokio::test]
    async fn test_get_profile_mapper_failure_is_internal() {
        let mut mapper = MockProfileMapperLike::new();
        mapper.expect_map_profile().returning(|_| {
            Err(MapperError::Internal {
                msg: "down".to_string(),
                source: None,
            })
        });

        let (status, body) = send(
            app(MockProfileRepositoryLike::new(), mapper),
            get_profile("u-1"),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
    }

    #[tokio::test]
    async fn test_get_profile_not_found() {
        let mut repo = MockProfileRepositoryLike::new();
        repo.expect_get_profile()
            .returning(|key| Err(StorageError::not_found("profile", key)));

        let (status, body) = send(app(repo, mapper_to("p-1")), get_profile("u-1")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            serde_json::json!({"message": "Profile not found", "data": null, "error": true})
        );
    }

    #[tokio::test]
    async fn test_activate_profile_success() {
        let mut repo = MockProfileRepositoryLike::new();
        repo.expect_activate_profile()
            .withf(|p| p.id.as_deref() == Some("p-1") && p.user_id.as_deref() == Some("u-1"))
            .returning(Ok);

        let (status, body) = send(app(repo, MockProfileMapperLike::new()), activate("u-1")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({"message": "Success", "data": null, "error": false})
        );
    }

    #[tokio::test]
    async fn test_activate_profile_error_statuses() {
        let cases: Vec<(StorageError, StatusCode, &str)> = vec![
            (
                ValidationError::FieldEmpty { field: "user_id" }.into(),
                StatusCode::UNPROCESSABLE_ENTITY,
                "Invalid profile",
            ),
            (
                StorageError::NotUnique {
                    msg: "dup".to_string(),
                    source: None,
                },
                StatusCode::CONFLICT,
                "Profile not unique",
            ),
            (
                StorageError::internal("exec", anyhow::anyhow!("disk I/O error")),
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
            ),
        ];

        for (err, expected_status, expected_message) in cases {
            let mut repo = MockProfileRepositoryLike::new();
            repo.expect_activate_profile()
                .times(1)
                .return_once(move |_| Err(err));

            let (status, body) =
                send(app(repo, MockProfileMapperLike::new()), activate("u-1")).await;

            assert_eq!(status, expected_status);
            assert_eq!(
                body,
                serde_json::json!({"message": expected_message, "data": null, "error": true})
            );
        }
    }

    #[test]
    fn test_openapi_lists_profile_operations() {
        let spec = get_openapi_spec();
        let item = spec.paths.paths.get("/profiles").unwrap();
        assert!(item.get.is_some());
        assert!(item.post.is_some());
    }
}
