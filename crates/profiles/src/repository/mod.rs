//! Profile storages and the user id to profile id mapper.

pub mod sqlite;
mod transactional;
mod validating;

use async_trait::async_trait;
use shared::error::StorageError;
use thiserror::Error;

pub use sqlite::{ProfileLookup, ProfileMapper, Repository};
pub use transactional::TransactionalProfileRepository;
pub use validating::ValidatingProfileRepository;

use crate::logic::{Profile, ProfileId};

/// Storage contract for profiles, implemented by the base adapter and by
/// every decorator around it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepositoryLike: Send + Sync {
    /// Looks a profile up by the key the storage is configured with.
    async fn get_profile(&self, key: &str) -> Result<Profile, StorageError>;

    /// Persists a new profile, returning it with its id.
    async fn activate_profile(&self, profile: Profile) -> Result<Profile, StorageError>;
}

#[derive(Error, Debug)]
pub enum MapperError {
    #[error("mapper: no profile for user {user_id}")]
    NotFound { user_id: String },
    #[error("mapper: internal mapper error: {msg}")]
    Internal {
        msg: String,
        #[source]
        source: Option<anyhow::Error>,
    },
}

/// Resolves the user id of an authenticated caller to their profile id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileMapperLike: Send + Sync {
    async fn map_profile(&self, user_id: &str) -> Result<ProfileId, MapperError>;
}
