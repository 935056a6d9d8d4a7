//! Resolves the caller's profile before a handler runs.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use http::{StatusCode, request::Parts};
use shared::adapters::openapi::{Envelope, JsonResponse};
use tracing::trace;

use crate::logic::{ProfileDto, ProfileId, USER_ID_HEADER};
use crate::repository::{MapperError, ProfileLookup};
use crate::service::ProfileService;

/// Profile of the caller identified by the `User-Id` header.
///
/// Extracting it maps the header to a profile id and records that id as a
/// [`ProfileId`] request extension. An unknown user is rejected with 401 before
/// the handler runs.
#[derive(Debug, Clone)]
pub struct MappedProfile {
    pub profile_id: ProfileId,
    pub user_id: String,
}

impl MappedProfile {
    /// The key a repository configured with `lookup` finds this profile by.
    pub fn key(&self, lookup: ProfileLookup) -> &str {
        match lookup {
            ProfileLookup::Id => self.profile_id.as_str(),
            ProfileLookup::UserId => &self.user_id,
        }
    }
}

/// Reads the `User-Id` header; a missing or non-ASCII header reads as empty.
pub fn user_id_from_headers(headers: &http::HeaderMap) -> String {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

impl FromRequestParts<Arc<ProfileService>> for MappedProfile {
    type Rejection = JsonResponse<ProfileDto>;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &Arc<ProfileService>,
    ) -> Result<Self, Self::Rejection> {
        let user_id = user_id_from_headers(&parts.headers);

        trace!(user_id = %user_id, "Mapping profile");
        match ctx.mapper.map_profile(&user_id).await {
            Ok(profile_id) => {
                parts.extensions.insert(profile_id.clone());
                Ok(MappedProfile {
                    profile_id,
                    user_id,
                })
            }
            Err(e) => {
                let (status, message) = match &e {
                    MapperError::NotFound { .. } => (StatusCode::UNAUTHORIZED, "Profile not found"),
                    MapperError::Internal { .. } => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
                    }
                };
                let envelope = Envelope::message(message).flagged(true);
                Err(JsonResponse::new(status, envelope).with_error(&e))
            }
        }
    }
}
