use shared::{
    error::{ApiError, ErrorCode},
    protocol::FieldError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("sponsor form has {} invalid field(s)", .0.len())]
    Validation(Vec<FieldError>),
    #[error("No authenticated user found")]
    Unauthorized,
    #[error("Cannot delete sponsor without an ID")]
    MissingIdentifier,
    #[error("a request for this action is already in progress")]
    Busy,
    #[error("sponsor store request failed: {0:#}")]
    Store(#[source] anyhow::Error),
}

impl DirectoryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            DirectoryError::Validation(_) | DirectoryError::MissingIdentifier => {
                ErrorCode::Validation
            }
            DirectoryError::Unauthorized => ErrorCode::Unauthorized,
            DirectoryError::Busy => ErrorCode::Conflict,
            DirectoryError::Store(_) => ErrorCode::Upstream,
        }
    }

    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            DirectoryError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

impl From<&DirectoryError> for ApiError {
    fn from(value: &DirectoryError) -> Self {
        ApiError::new(value.code(), value.to_string())
    }
}
