//! Informational - Display projections and countdowns
//! Read-only views over session state, no chain access

pub mod countdown;
pub mod display;

pub use display::{global_price_view, vault_view, GlobalPriceView, VaultView};
