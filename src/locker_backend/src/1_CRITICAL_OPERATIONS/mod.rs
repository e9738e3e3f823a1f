//! Critical Operations - Transactions, confirmation and the refresh scheduler
//! Everything that leads to a signed transaction or drives periodic chain reads

pub mod create_vault;
pub mod withdrawals;
pub mod confirmation;
pub mod refresh_scheduler;
pub mod sessions;


use candid::{CandidType, Deserialize, Nat};
use serde::Serialize;

/// Unsigned transaction handed to the wallet
#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TransactionRequest {
    pub to: String,
    /// 0x-prefixed calldata
    pub data: String,
    /// Wei attached to the call
    pub value: Nat,
    pub description: String,
}

// Re-export commonly used items
pub use create_vault::{confirm_create_vault, prepare_create_vault, CreateOutcome, CreateVaultArgs};
pub use withdrawals::{prepare_rescue, prepare_withdraw, RescueTarget};
