//! Transaction confirmation
//!
//! Mutating calls are never retried here: we only watch for the receipt of a
//! transaction the wallet already broadcast. Receipt reads go through the
//! resilient call layer; polling is bounded.

use ic_stable_structures::Memory;
use crate::_2_CRITICAL_DATA::session::{RefreshReport, Session};
use crate::_4_RPC_ACCESS::json_rpc::{ChainReader, TxReceipt};
use crate::_4_RPC_ACCESS::resilient_call;
use crate::infrastructure::constants::{DEFAULT_CALL_ATTEMPTS, RECEIPT_POLL_ATTEMPTS, RECEIPT_POLL_INTERVAL_MS};
use crate::infrastructure::errors::{Result, TransactionError, ValidationError};
use crate::infrastructure::{log, record_event, EventLevel};

/// `0x` plus 64 hex characters, returned lower-case
pub fn validate_tx_hash(input: &str) -> Result<String> {
    let trimmed = input.trim();
    let body = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X"));

    match body {
        Some(hex) if hex.len() == 64 && hex.chars().all(|c| c.is_ascii_hexdigit()) => {
            Ok(format!("0x{}", hex.to_lowercase()))
        }
        _ => Err(ValidationError::InvalidTransactionHash { hash: input.to_string() }.into()),
    }
}

pub async fn await_receipt<R: ChainReader>(reader: &R, tx_hash: &str) -> Result<TxReceipt> {
    await_receipt_with(reader, tx_hash, RECEIPT_POLL_ATTEMPTS, RECEIPT_POLL_INTERVAL_MS).await
}

/// Poll until the receipt exists; a reverted receipt is an error
pub async fn await_receipt_with<R: ChainReader>(
    reader: &R,
    tx_hash: &str,
    polls: u32,
    interval_ms: u64,
) -> Result<TxReceipt> {
    for poll in 1..=polls {
        match resilient_call(reader, DEFAULT_CALL_ATTEMPTS, |source| reader.receipt(source, tx_hash)).await {
            Ok(Some(receipt)) if receipt.succeeded => {
                log!("✅ {} finalized after {} poll(s)", tx_hash, poll);
                return Ok(receipt);
            }
            Ok(Some(_)) => {
                record_event(EventLevel::Error, "confirm", format!("{} reverted", tx_hash));
                return Err(TransactionError::Reverted { tx_hash: tx_hash.to_string() }.into());
            }
            Ok(None) => {}
            Err(e) => log!("⚠️ Receipt poll {} for {} failed: {}", poll, tx_hash, e),
        }

        if poll < polls {
            reader.pause(interval_ms).await;
        }
    }

    record_event(EventLevel::Error, "confirm", format!("{} not finalized after {} poll(s)", tx_hash, polls));
    Err(TransactionError::NotFinalized { tx_hash: tx_hash.to_string(), polls }.into())
}

/// Wait for a withdraw or rescue to finalize, then refresh every vault
pub async fn confirm_transaction<R: ChainReader, M: Memory>(
    session: &Session<R, M>,
    tx_hash: &str,
) -> Result<RefreshReport> {
    let tx_hash = validate_tx_hash(tx_hash)?;
    await_receipt(session.reader(), &tx_hash).await?;
    Ok(session.refresh_all().await)
}
