use thiserror::Error;

use crate::error::ApiError;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("No orders selected")]
    NoOrdersSelected,
    #[error("Invalid order id: {0}")]
    InvalidOrderId(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}
