use thiserror::Error;

use crate::error::{ApiError, FieldErrors};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Service validation error: {0}")]
    Validation(FieldErrors),
    #[error(transparent)]
    Api(#[from] ApiError),
}
