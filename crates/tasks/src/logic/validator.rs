use shared::validation::{ValidationError, Validator};

use super::Task;

pub const TITLE_MAX_LEN: usize = 50;
pub const DESCRIPTION_MAX_LEN: usize = 150;

/// Task invariants, checked in a fixed order; the first failure wins.
///
/// `title` and `completed` are required, `title` must be non-empty and at most
/// [`TITLE_MAX_LEN`] bytes, and `description`, when present, at most
/// [`DESCRIPTION_MAX_LEN`] bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskValidator;

impl Validator<Task> for TaskValidator {
    fn validate(&self, task: &Task) -> Result<(), ValidationError> {
        let Some(title) = &task.title else {
            return Err(ValidationError::FieldRequired { field: "title" });
        };
        if task.completed.is_none() {
            return Err(ValidationError::FieldRequired { field: "completed" });
        }

        if title.is_empty() {
            return Err(ValidationError::FieldEmpty { field: "title" });
        }
        if title.len() > TITLE_MAX_LEN {
            return Err(ValidationError::FieldQuality { field: "title" });
        }

        if let Some(description) = &task.description {
            if description.len() > DESCRIPTION_MAX_LEN {
                return Err(ValidationError::FieldQuality {
                    field: "description",
                });
            }
        }

        Ok(())
    }
}
