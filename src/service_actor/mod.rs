//! Service catalog records for the in-process panel backend.

mod dtos;
pub mod entity;
pub mod error;

pub use dtos::*;
pub use error::*;
