use thiserror::Error;

use crate::error::{ApiError, FieldErrors};

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("You cannot delete your own account!")]
    CannotDeleteSelf,
    #[error("You cannot ban your own account!")]
    CannotBanSelf,
    #[error("User already exists: {0}")]
    AlreadyExists(String),
    #[error("Nothing to update")]
    EmptyUpdate,
    #[error("User validation error: {0}")]
    Validation(FieldErrors),
    #[error(transparent)]
    Api(#[from] ApiError),
}
