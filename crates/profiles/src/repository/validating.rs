use async_trait::async_trait;
use shared::{error::StorageError, validation::Validator};
use tracing::debug;

use crate::logic::Profile;
use crate::repository::ProfileRepositoryLike;

/// Validates profiles before they reach the wrapped storage.
///
/// Reads pass straight through. A profile that fails validation is rejected
/// with [`StorageError::Invalid`] and the wrapped storage is never called.
pub struct ValidatingProfileRepository<R, V> {
    inner: R,
    validator: V,
}

impl<R, V> ValidatingProfileRepository<R, V>
where
    R: ProfileRepositoryLike,
    V: Validator<Profile>,
{
    pub fn new(inner: R, validator: V) -> Self {
        Self { inner, validator }
    }
}

#[async_trait]
impl<R, V> ProfileRepositoryLike for ValidatingProfileRepository<R, V>
where
    R: ProfileRepositoryLike,
    V: Validator<Profile>,
{
    async fn get_profile(&self, key: &str) -> Result<Profile, StorageError> {
        self.inner.get_profile(key).await
    }

    async fn activate_profile(&self, mut profile: Profile) -> Result<Profile, StorageError> {
        self.validator.apply_defaults(&mut profile)?;
        if let Err(e) = self.validator.validate(&profile) {
            debug!(error = %e, "rejecting invalid profile");
            return Err(e.into());
        }
        self.inner.activate_profile(profile).await
    }
}
