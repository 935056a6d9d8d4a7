//! Validation contract shared by every entity.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    FieldRequired,
    FieldEmpty,
    FieldQuality,
    InvalidProfile,
    Internal,
}

/// First invariant violation found by a [`Validator`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("validator: field required: {field}")]
    FieldRequired { field: &'static str },
    #[error("validator: field empty: {field}")]
    FieldEmpty { field: &'static str },
    #[error("validator: field quality: {field}")]
    FieldQuality { field: &'static str },
    #[error("validator: invalid profile - {reason}")]
    InvalidProfile { reason: String },
    #[error("validator: internal validator error: {msg}")]
    Internal { msg: String },
}

impl ValidationError {
    pub fn kind(&self) -> ValidationErrorKind {
        match self {
            ValidationError::FieldRequired { .. } => ValidationErrorKind::FieldRequired,
            ValidationError::FieldEmpty { .. } => ValidationErrorKind::FieldEmpty,
            ValidationError::FieldQuality { .. } => ValidationErrorKind::FieldQuality,
            ValidationError::InvalidProfile { .. } => ValidationErrorKind::InvalidProfile,
            ValidationError::Internal { .. } => ValidationErrorKind::Internal,
        }
    }

    /// Name of the offending field, when the failure is tied to one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::FieldRequired { field }
            | ValidationError::FieldEmpty { field }
            | ValidationError::FieldQuality { field } => Some(field),
            ValidationError::InvalidProfile { .. } | ValidationError::Internal { .. } => None,
        }
    }
}

/// Checks entity invariants. Implementations are pure: no I/O, and `validate`
/// reports only the first failure it finds.
pub trait Validator<T>: Send + Sync {
    /// Assigns default values before validation runs.
    fn apply_defaults(&self, _entity: &mut T) -> Result<(), ValidationError> {
        Ok(())
    }

    fn validate(&self, entity: &T) -> Result<(), ValidationError>;
}
