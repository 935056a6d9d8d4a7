use crate::repository::TaskRepositoryLike;

/// Dependencies of the task endpoints.
pub struct TaskService {
    pub repository: Box<dyn TaskRepositoryLike>,
}

impl TaskService {
    pub fn new(repository: Box<dyn TaskRepositoryLike>) -> Self {
        Self { repository }
    }
}
