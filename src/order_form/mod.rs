//! Polymorphic order creation: which fields each order type needs, the form
//! state that collects them, and the adapter that submits the result.

pub mod controller;
pub mod draft;
pub mod payload;
pub mod registry;
pub mod submission;

pub use controller::*;
pub use draft::*;
pub use payload::*;
pub use registry::*;
pub use submission::*;
