//! Tasks crate: the task entity, its storages and HTTP endpoints.

pub mod logic;
pub mod repository;
pub mod router;
pub mod service;

pub use logic::{Task, TaskValidator};
pub use repository::{
    MemoryTaskRepository, Repository, TaskRepositoryLike, TransactionalTaskRepository,
};
pub use router::create_router;
pub use service::TaskService;
