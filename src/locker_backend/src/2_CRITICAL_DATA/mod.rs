//! Critical Data - Vault registry, vault state and session context
//! Source of truth for everything the client displays about a vault

pub mod registry;
pub mod vault_state;
pub mod vault_loader;
pub mod session;

pub use session::{RefreshReport, RestoreReport};
