use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum DomainError {
    #[error("Validation: {0}")]
    Validation(String),

    #[error("Not found: {entity} with id={id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    TransientStore(String),

    #[error("Corrupt document {collection}/{id}: {reason}")]
    CorruptDocument {
        collection: &'static str,
        id: String,
        reason: String,
    },
}

/// Error tag surfaced to UI and API layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    TransientStore,
    CorruptDocument,
}

/// Structured error body: the kind tag plus a message a UI can show as-is.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub kind: ErrorKind,
    pub message: String,
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::TransientStore(_) => ErrorKind::TransientStore,
            Self::CorruptDocument { .. } => ErrorKind::CorruptDocument,
        }
    }

    /// Whether the operation may succeed if the caller retries it.
    ///
    /// The catalog itself never retries; this is a hint for callers.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientStore(_))
    }

    pub fn payload(&self) -> ErrorPayload {
        let message = match self {
            Self::Validation(msg) | Self::Conflict(msg) | Self::TransientStore(msg) => msg.clone(),
            other => other.to_string(),
        };
        ErrorPayload {
            kind: self.kind(),
            message,
        }
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<InfraError> for DomainError {
    fn from(err: InfraError) -> Self {
        DomainError::TransientStore(err.to_string())
    }
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(err: sea_orm::DbErr) -> Self {
        InfraError::from(err).into()
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
