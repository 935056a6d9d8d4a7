use std::fmt;

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use thiserror::Error;

use crate::adapters::openapi::Envelope;
use crate::validation::ValidationError;

/// Closed set of storage failure kinds handlers translate into HTTP statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageErrorKind {
    NotFound,
    NotUnique,
    Invalid,
    Internal,
}

impl fmt::Display for StorageErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StorageErrorKind::NotFound => "not found",
            StorageErrorKind::NotUnique => "not unique",
            StorageErrorKind::Invalid => "invalid",
            StorageErrorKind::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// Error returned by every repository, whether it is a base adapter or a decorator.
///
/// Decorators never replace a kind they received from the layer below, so the
/// kind observed by a handler is the kind produced where the failure happened.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage: record not found: {msg}")]
    NotFound {
        msg: String,
        lookup_id: String,
        #[source]
        source: Option<anyhow::Error>,
    },
    #[error("storage: record not unique: {msg}")]
    NotUnique {
        msg: String,
        #[source]
        source: Option<anyhow::Error>,
    },
    #[error("storage: invalid record: {msg}")]
    Invalid {
        msg: String,
        #[source]
        source: ValidationError,
    },
    #[error("storage: internal storage error: {msg}")]
    Internal {
        msg: String,
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl StorageError {
    pub fn kind(&self) -> StorageErrorKind {
        match self {
            StorageError::NotFound { .. } => StorageErrorKind::NotFound,
            StorageError::NotUnique { .. } => StorageErrorKind::NotUnique,
            StorageError::Invalid { .. } => StorageErrorKind::Invalid,
            StorageError::Internal { .. } => StorageErrorKind::Internal,
        }
    }

    pub fn is(&self, kind: StorageErrorKind) -> bool {
        self.kind() == kind
    }

    pub fn not_found(msg: impl Into<String>, lookup_id: impl Into<String>) -> Self {
        StorageError::NotFound {
            msg: msg.into(),
            lookup_id: lookup_id.into(),
            source: None,
        }
    }

    pub fn internal<E>(msg: impl Into<String>, source: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        StorageError::Internal {
            msg: msg.into(),
            source: Some(source.into()),
        }
    }

    /// The validation failure behind an `Invalid` error.
    pub fn validation_error(&self) -> Option<&ValidationError> {
        match self {
            StorageError::Invalid { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ValidationError> for StorageError {
    fn from(e: ValidationError) -> Self {
        StorageError::Invalid {
            msg: e.to_string(),
            source: e,
        }
    }
}

/// Infrastructure failures raised while bootstrapping the server.
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("unknown error")]
    Unknown(#[from] anyhow::Error),
    #[error("invalid configuration: {msg}")]
    InvalidConfiguration {
        msg: String,
        #[source]
        source: Option<anyhow::Error>,
    },
    #[error("sqlite database error")]
    SqliteError {
        #[from]
        #[source]
        source: libsql::Error,
    },
    #[error("io error")]
    IoError {
        #[from]
        #[source]
        source: std::io::Error,
    },
    #[error("url parse error")]
    UrlParseError {
        #[from]
        #[source]
        source: url::ParseError,
    },
    #[error("serde json error")]
    SerdeSerializationError {
        #[from]
        #[source]
        source: serde_json::Error,
    },
    #[error("address parse error")]
    AddrParseError {
        #[from]
        #[source]
        source: std::net::AddrParseError,
    },
}

impl IntoResponse for CommonError {
    fn into_response(self) -> Response {
        tracing::error!(error = ?self, "unhandled error reached the http boundary");
        let body: Envelope<()> = Envelope::message("internal error");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
