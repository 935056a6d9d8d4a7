use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use shared::{
    error::StorageError,
    primitives::{IdGenerator, UuidV4Generator},
    validation::Validator,
};
use tracing::debug;

use crate::logic::{Task, TaskValidator};
use crate::repository::TaskRepositoryLike;

/// Task storage kept in process memory.
///
/// Clones share the same store, so it can back a server as well as tests.
#[derive(Clone)]
pub struct MemoryTaskRepository {
    tasks: Arc<Mutex<Vec<Task>>>,
    validator: Arc<dyn Validator<Task>>,
    id_generator: Arc<dyn IdGenerator>,
}

impl Default for MemoryTaskRepository {
    fn default() -> Self {
        Self::new(
            Vec::new(),
            Arc::new(TaskValidator),
            Arc::new(UuidV4Generator),
        )
    }
}

impl MemoryTaskRepository {
    pub fn new(
        tasks: Vec<Task>,
        validator: Arc<dyn Validator<Task>>,
        id_generator: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            tasks: Arc::new(Mutex::new(tasks)),
            validator,
            id_generator,
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.lock().is_empty()
    }
}

#[async_trait]
impl TaskRepositoryLike for MemoryTaskRepository {
    async fn get_task(&self, id: &str) -> Result<Task, StorageError> {
        self.tasks
            .lock()
            .iter()
            .find(|t| t.id.as_deref() == Some(id))
            .cloned()
            .ok_or_else(|| StorageError::not_found("task", id))
    }

    async fn save_task(&self, mut task: Task) -> Result<Task, StorageError> {
        self.validator.apply_defaults(&mut task)?;
        self.validator.validate(&task)?;

        let id = self.id_generator.generate();
        debug!(task_id = %id, "storing task in memory");
        task.id = Some(id);
        self.tasks.lock().push(task.clone());
        Ok(task)
    }
}
