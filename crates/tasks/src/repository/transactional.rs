use async_trait::async_trait;
use shared::{
    error::StorageError,
    transaction::{TransactionError, Transactioner},
};

use crate::logic::Task;
use crate::repository::TaskRepositoryLike;

/// Runs every call of the wrapped task storage inside its own transaction.
pub struct TransactionalTaskRepository<R, T> {
    inner: R,
    transactioner: T,
}

impl<R, T> TransactionalTaskRepository<R, T>
where
    R: TaskRepositoryLike,
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
        Err(tx_err) => StorageError::internal("task transaction failed", tx_err),
    }
}

#[async_trait]
impl<R, T> TaskRepositoryLike for TransactionalTaskRepository<R, T>
where
    R: TaskRepositoryLike,
    T: Transactioner,
{
    async fn get_task(&self, id: &str) -> Result<Task, StorageError> {
        self.transactioner
            .run(self.inner.get_task(id))
            .await
            .map_err(into_storage_error)
    }

    async fn save_task(&self, task: Task) -> Result<Task, StorageError> {
        self.transactioner
            .run(self.inner.save_task(task))
            .await
            .map_err(into_storage_error)
    }
}
