//! Infrastructure - Shared utilities and types
//! Foundation layer for all other modules

pub mod constants;
pub mod errors;
pub mod config;
pub mod logging;
pub mod clock;
pub mod math;
pub mod stable_storage;
pub mod caller;

// Re-export commonly used items
pub use errors::{LockerError, Result};
pub use config::LockerConfig;
pub(crate) use logging::log;
pub use logging::{record_event, recent_events, EventLevel, EventRecord};
pub use caller::require_caller;
