mod validator;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use validator::{DESCRIPTION_MAX_LEN, TITLE_MAX_LEN, TaskValidator};

/// A task. Every field may be absent; absent fields are stored as NULL and
/// rendered as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Task {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

/// Body of a create request. An `id` sent by the client is ignored.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl From<CreateTaskRequest> for Task {
    fn from(req: CreateTaskRequest) -> Self {
        Task {
            id: None,
            title: req.title,
            description: req.description,
            completed: req.completed,
        }
    }
}
