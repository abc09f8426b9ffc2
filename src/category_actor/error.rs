use thiserror::Error;

use crate::error::{ApiError, FieldError, FieldErrors};

/// Errors that can occur during category operations.
#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("Category validation error: {0}")]
    Validation(FieldErrors),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl From<FieldError> for CategoryError {
    fn from(error: FieldError) -> Self {
        CategoryError::Validation(error.into())
    }
}
