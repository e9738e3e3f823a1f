//! Shared domain types

pub mod address;
pub mod assets;

pub use address::Address;
pub use assets::{LockAsset, PairConfig};
