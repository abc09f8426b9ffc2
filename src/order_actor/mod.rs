//! Order records for the in-process panel backend, including refill and
//! cancel handling.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use entity::OrderRecord;
pub use error::*;
