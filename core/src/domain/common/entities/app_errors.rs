use sea_orm::DbErr;
use thiserror::Error;

/// Broad failure categories exposed to callers that map errors onto an
/// outer surface (HTTP status, CLI exit code, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    NotFound,
    Resource,
    Data,
}

#[derive(Debug, Error)]
pub enum DaoError {
    #[error("unknown column: {column}")]
    UnknownColumn { column: String },

    #[error("invalid sort direction: {direction}")]
    InvalidDirection { direction: String },

    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("missing mandatory field: {field}")]
    MissingField { field: &'static str },

    #[error("ambiguous field mapping: {field}")]
    AmbiguousMapping { field: &'static str },

    #[error("{resource} not found ({key})")]
    NotFound { resource: &'static str, key: String },

    #[error("{resource}: {reason}")]
    ResourceConflict { resource: &'static str, reason: String },

    #[error("storage operation failed on {resource}")]
    Storage {
        resource: &'static str,
        #[source]
        source: DbErr,
    },

    #[error("provisioning service error: {0}")]
    ExternalService(String),
}

impl DaoError {
    pub fn unknown_column(column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            column: column.into(),
        }
    }

    pub fn invalid_direction(direction: impl Into<String>) -> Self {
        Self::InvalidDirection {
            direction: direction.into(),
        }
    }

    pub fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub fn missing_field(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    pub fn not_found(resource: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            key: key.into(),
        }
    }

    pub fn conflict(resource: &'static str, reason: impl Into<String>) -> Self {
        Self::ResourceConflict {
            resource,
            reason: reason.into(),
        }
    }

    pub fn storage(resource: &'static str, source: DbErr) -> Self {
        Self::Storage { resource, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownColumn { .. }
            | Self::InvalidDirection { .. }
            | Self::InvalidInput { .. }
            | Self::MissingField { .. }
            | Self::AmbiguousMapping { .. } => ErrorKind::Input,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::ResourceConflict { .. } => ErrorKind::Resource,
            Self::Storage { .. } | Self::ExternalService(_) => ErrorKind::Data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(DaoError::unknown_column("foo").kind(), ErrorKind::Input);
        assert_eq!(DaoError::missing_field("name").kind(), ErrorKind::Input);
        assert_eq!(DaoError::not_found("voicemail", "id=3").kind(), ErrorKind::NotFound);
        assert_eq!(
            DaoError::conflict("voicemail", "still attached").kind(),
            ErrorKind::Resource
        );
        assert_eq!(
            DaoError::storage("line", DbErr::Custom("boom".to_string())).kind(),
            ErrorKind::Data
        );
    }

    #[test]
    fn test_messages_name_the_offending_field() {
        let err = DaoError::unknown_column("toto");
        assert_eq!(err.to_string(), "unknown column: toto");

        let err = DaoError::missing_field("name");
        assert_eq!(err.to_string(), "missing mandatory field: name");

        let err = DaoError::not_found("extension", "id=42");
        assert_eq!(err.to_string(), "extension not found (id=42)");
    }
}
