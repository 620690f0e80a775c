//! System orchestration, startup, and shutdown logic.

pub mod service_system;
pub mod tracing;

pub use self::tracing::setup_tracing;
pub use service_system::*;
