//! Account records for the in-process panel backend.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
