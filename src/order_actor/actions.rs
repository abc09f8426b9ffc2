use crate::domain::OrderStatus;

/// Custom actions for Order entities beyond CRUD.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Requests a top-up of drops on a delivered order.
    ///
    /// # Errors
    /// Fails unless the order is completed or partial.
    Refill,
    /// Requests cancellation; refused (not failed) once delivery finished.
    Cancel,
    /// Provider progress update.
    UpdateStatus(OrderStatus),
}

/// Results from OrderActions - variants match 1:1 with OrderAction
#[derive(Debug, Clone, PartialEq)]
pub enum OrderActionResult {
    Refill,
    Cancel(Result<(), String>),
    UpdateStatus(OrderStatus),
}
