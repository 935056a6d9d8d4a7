//! Task storages: the sqlite and in-memory base adapters and the
//! transactional decorator.

mod memory;
pub mod sqlite;
mod transactional;

use async_trait::async_trait;
use shared::error::StorageError;

pub use memory::MemoryTaskRepository;
pub use sqlite::Repository;
pub use transactional::TransactionalTaskRepository;

use crate::logic::Task;

/// Storage contract for tasks, implemented by base adapters and decorators alike.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepositoryLike: Send + Sync {
    /// Looks a task up by its primary key.
    async fn get_task(&self, id: &str) -> Result<Task, StorageError>;

    /// Validates and persists a new task, returning it with its assigned id.
    async fn save_task(&self, task: Task) -> Result<Task, StorageError>;
}
