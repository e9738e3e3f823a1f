//! Vault creation
//!
//! The wallet signs in the browser. This side validates the request, builds the
//! factory call and, once the transaction is mined, finds the new vault in the
//! receipt and starts tracking it.

pub mod create_validator;

use candid::{CandidType, Deserialize, Nat};
use ic_stable_structures::Memory;
use serde::Serialize;
use crate::_2_CRITICAL_DATA::session::Session;
use crate::_4_RPC_ACCESS::abi::{self, selectors, Token};
use crate::_4_RPC_ACCESS::json_rpc::{ChainReader, TxReceipt};
use crate::infrastructure::errors::Result;
use crate::infrastructure::log;
use crate::types::{Address, LockAsset};
use super::confirmation::{await_receipt, validate_tx_hash};
use super::TransactionRequest;

pub use create_validator::{validate_create_request, ValidatedCreate};

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct CreateVaultArgs {
    pub asset: LockAsset,
    /// Decimal amount in whole tokens
    pub amount: String,
    /// USD per one lock token
    pub target_price: String,
    /// Unix seconds
    pub unlock_time: u64,
}

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct CreateOutcome {
    pub tx_hash: String,
    pub vault: Option<String>,
    pub message: String,
}

/// `createVaultAndDeposit` call; the native asset is sent as value
pub fn prepare_create_vault(args: &CreateVaultArgs, factory: &Address, now: u64) -> Result<TransactionRequest> {
    let v = validate_create_request(args, now)?;

    let data = abi::encode_call(
        selectors::CREATE_VAULT_AND_DEPOSIT,
        &[
            Token::Address(v.asset.lock_token_address()),
            Token::Uint(v.amount.clone()),
            Token::Uint(v.threshold_1e18.clone()),
            Token::Uint(v.unlock_time.into()),
        ],
    );

    let value = if v.asset.is_native() { Nat::from(v.amount.clone()) } else { Nat::from(0u8) };

    log!("📝 Prepared vault creation: {} {} until {}", args.amount.trim(), v.asset.label(), v.unlock_time);

    Ok(TransactionRequest {
        to: factory.to_hex(),
        data: abi::to_hex_data(&data),
        value,
        description: format!("Lock {} {}", args.amount.trim(), v.asset.label()),
    })
}

/// New vault address from a `VaultCreated` log emitted by the factory
pub fn created_vault(receipt: &TxReceipt, factory: &Address) -> Option<Address> {
    receipt
        .logs
        .iter()
        .filter(|entry| entry.address == *factory)
        .find_map(|entry| abi::decode_vault_created(&entry.topics, &entry.data))
        .map(|event| event.vault)
}

/// Wait for the creation to finalize, then track and load the new vault
pub async fn confirm_create_vault<R: ChainReader, M: Memory>(
    session: &Session<R, M>,
    tx_hash: &str,
) -> Result<CreateOutcome> {
    let tx_hash = validate_tx_hash(tx_hash)?;
    let receipt = await_receipt(session.reader(), &tx_hash).await?;

    match created_vault(&receipt, session.factory()) {
        Some(vault) => {
            log!("✅ Vault {} created in {}", vault, tx_hash);
            session.track_vault(&vault).await;
            Ok(CreateOutcome {
                tx_hash,
                vault: Some(vault.to_hex()),
                message: "Vault created.".to_string(),
            })
        }
        None => {
            log!("⚠️ {} succeeded without a VaultCreated event", tx_hash);
            Ok(CreateOutcome {
                tx_hash,
                vault: None,
                message: "Created, but vault address not parsed.".to_string(),
            })
        }
    }
}
