use async_trait::async_trait;
use shared::{
    error::StorageError,
    transaction::{TransactionError, Transactioner},
};

use crate::logic::Profile;
use crate::repository::ProfileRepositoryLike;

/// Runs each call of the wrapped profile storage inside its own transaction.
///
/// A failure of the wrapped call comes back unchanged. Begin, commit and
/// rollback failures come back as [`StorageError::Internal`].
pub struct TransactionalProfileRepository<R, T> {
    inner: R,
    transactioner: T,
}

impl<R, T> TransactionalProfileRepository<R, T>
where
    R: ProfileRepositoryLike,
    T: Transactioner,
{
    pub fn new(inner: R, transactioner: T) -> Self {
        Self {
            inner,
            transactioner,
        }
    }
}

fn into_storage_error(err: TransactionError<StorageError>) -> StorageError {
    match err.into_operation() {
        Ok(operation) => operation,
        Err(tx_err) => StorageError::internal("profile transaction failed", tx_err),
    }
}

#[async_trait]
impl<R, T> ProfileRepositoryLike for TransactionalProfileRepository<R, T>
where
    R: ProfileRepositoryLike,
    T: Transactioner,
{
    async fn get_profile(&self, key: &str) -> Result<Profile, StorageError> {
        self.transactioner
            .run(self.inner.get_profile(key))
            .await
            .map_err(into_storage_error)
    }

    async fn activate_profile(&self, profile: Profile) -> Result<Profile, StorageError> {
        self.transactioner
            .run(self.inner.activate_profile(profile))
            .await
            .map_err(into_storage_error)
    }
}
