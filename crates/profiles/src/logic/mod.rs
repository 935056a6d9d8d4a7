mod validator;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use validator::{
    DEFAULT_EMAIL_REGEX, DEFAULT_PHONE_REGEX, ProfileValidator, ProfileValidatorConfig,
};

/// Header carrying the caller's user id, issued by the authentication service.
pub const USER_ID_HEADER: &str = "User-Id";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Profile {
    pub id: Option<String>,
    /// Id of the user in the central authentication service. Unique per profile.
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Profile as returned to its owner. The internal id is not exposed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProfileDto {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl From<Profile> for ProfileDto {
    fn from(profile: Profile) -> Self {
        ProfileDto {
            user_id: profile.user_id,
            name: profile.name,
            email: profile.email,
            phone: profile.phone,
            address: profile.address,
        }
    }
}

/// Profile id resolved from the [`USER_ID_HEADER`] of the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileId(pub String);

impl ProfileId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
