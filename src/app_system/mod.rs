//! System orchestration, startup, and shutdown logic.

pub mod panel_system;
pub mod tracing;

pub use panel_system::*;
pub use self::tracing::setup_tracing;
