//! Vault state loader
//!
//! Static load and live refresh are each one joint fetch: any single failing
//! read fails the whole fetch and nothing is applied.

use num_bigint::BigUint;
use crate::_4_RPC_ACCESS::abi::{self, selectors, Selector, Token};
use crate::_4_RPC_ACCESS::json_rpc::{ChainReader, Source};
use crate::_4_RPC_ACCESS::resilient::{self, resilient_call};
use crate::infrastructure::constants::DEFAULT_CALL_ATTEMPTS;
use crate::infrastructure::errors::{DecodeError, Result};
use crate::infrastructure::log;
use crate::infrastructure::math::to_u64_checked;
use crate::types::Address;
use super::vault_state::{LiveSnapshot, PriceDetail, VaultRecord};

async fn read_raw<R: ChainReader>(reader: &R, vault: &Address, selector: Selector) -> Result<Vec<u8>> {
    resilient::read(reader, vault, &abi::encode_call(selector, &[])).await
}

async fn read_address<R: ChainReader>(reader: &R, vault: &Address, selector: Selector) -> Result<Address> {
    abi::decode_address(&read_raw(reader, vault, selector).await?, 0)
}

async fn read_bool<R: ChainReader>(reader: &R, vault: &Address, selector: Selector) -> Result<bool> {
    abi::decode_bool(&read_raw(reader, vault, selector).await?, 0)
}

async fn read_uint<R: ChainReader>(reader: &R, vault: &Address, selector: Selector) -> Result<BigUint> {
    abi::decode_uint(&read_raw(reader, vault, selector).await?, 0)
}

async fn read_time<R: ChainReader>(reader: &R, vault: &Address, selector: Selector, field: &str) -> Result<u64> {
    to_u64_checked(&read_uint(reader, vault, selector).await?, field)
}

async fn read_price_detail<R: ChainReader>(reader: &R, vault: &Address) -> Result<PriceDetail> {
    abi::decode_price_detail(&read_raw(reader, vault, selectors::PRICE_DETAIL).await?)
}

/// Owner, lock token, native flag, withdrawn, start and unlock time; all or nothing
pub async fn load_static<R: ChainReader>(reader: &R, vault: &Address) -> Result<VaultRecord> {
    let (owner, lock_token, is_native, withdrawn, start_time, unlock_time) = futures::try_join!(
        read_address(reader, vault, selectors::OWNER),
        read_address(reader, vault, selectors::LOCK_TOKEN),
        read_bool(reader, vault, selectors::IS_NATIVE),
        read_bool(reader, vault, selectors::WITHDRAWN),
        read_time(reader, vault, selectors::START_TIME, "startTime"),
        read_time(reader, vault, selectors::UNLOCK_TIME, "unlockTime"),
    )?;

    if unlock_time < start_time {
        return Err(DecodeError::Inconsistent {
            reason: format!("vault {} unlocks at {} before it starts at {}", vault, unlock_time, start_time),
        }
        .into());
    }

    Ok(VaultRecord {
        address: *vault,
        owner,
        lock_token,
        is_native,
        withdrawn,
        start_time,
        unlock_time,
        live: None,
        countdown: None,
    })
}

/// Locked amount in base units
///
/// Native balances go straight to the fallback cluster; token balances use the
/// resilient call.
pub async fn fetch_locked_balance<R: ChainReader>(reader: &R, record: &VaultRecord) -> Result<BigUint> {
    if record.is_native {
        return reader.balance(Source::Fallback, &record.address).await;
    }

    let data = abi::encode_call(selectors::BALANCE_OF, &[Token::Address(record.address)]);
    let raw = resilient::read(reader, &record.lock_token, &data).await?;
    abi::decode_uint(&raw, 0)
}

/// Build a new live snapshot without touching the record
pub async fn fetch_live<R: ChainReader>(reader: &R, record: &VaultRecord, now: u64) -> Result<LiveSnapshot> {
    let vault = &record.address;
    let (withdrawn, can_withdraw, price_met, time_met, current_price_1e18, threshold_1e18, price_detail) = futures::try_join!(
        read_bool(reader, vault, selectors::WITHDRAWN),
        read_bool(reader, vault, selectors::CAN_WITHDRAW),
        read_bool(reader, vault, selectors::PRICE_CONDITION_MET),
        read_bool(reader, vault, selectors::TIME_CONDITION_MET),
        read_uint(reader, vault, selectors::CURRENT_PRICE_1E18),
        read_uint(reader, vault, selectors::PRICE_THRESHOLD_1E18),
        read_price_detail(reader, vault),
    )?;

    let locked_balance = match fetch_locked_balance(reader, record).await {
        Ok(balance) => Some(balance),
        Err(e) => {
            log!("⚠️ Locked balance of {} unavailable: {}", vault, e);
            None
        }
    };

    Ok(LiveSnapshot {
        withdrawn,
        can_withdraw,
        price_met,
        time_met,
        current_price_1e18,
        threshold_1e18,
        price_detail,
        locked_balance,
        fetched_at: now,
    })
}

/// Fetch then assign; on error the record keeps its previous snapshot
pub async fn refresh_live<R: ChainReader>(reader: &R, record: &mut VaultRecord, now: u64) -> Result<()> {
    let snapshot = fetch_live(reader, record, now).await?;
    record.apply_live(snapshot);
    Ok(())
}

/// Vaults the factory lists for `owner`
pub async fn discover_owned<R: ChainReader>(reader: &R, factory: &Address, owner: &Address) -> Result<Vec<Address>> {
    let data = abi::encode_call(selectors::VAULTS_OF, &[Token::Address(*owner)]);
    let raw = resilient::read(reader, factory, &data).await?;
    abi::decode_address_array(&raw)
}

/// `true` when the chain answers with the expected id
pub async fn check_network<R: ChainReader>(reader: &R, expected_chain_id: u64) -> Result<bool> {
    let id = resilient_call(reader, DEFAULT_CALL_ATTEMPTS, |source| reader.chain_id(source)).await?;
    if id != expected_chain_id {
        log!("⚠️ Wrong network: chain id {} (expected {})", id, expected_chain_id);
    }
    Ok(id == expected_chain_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::errors::LockerError;
    use crate::test_support::{addr, MockChain, VaultFixture, OWNER};
    use crate::types::LockAsset;
    use futures::executor::block_on;

    #[test]
    fn test_load_static() {
        let chain = MockChain::new();
        let vault = addr(0x21);
        chain.seed_vault(&vault, &VaultFixture::default());

        let record = block_on(load_static(&chain, &vault)).unwrap();
        assert_eq!(record.owner, OWNER);
        assert!(record.is_native);
        assert_eq!(record.start_time, 1_000);
        assert_eq!(record.unlock_time, 87_400);
        assert!(record.live.is_none());
    }

    #[test]
    fn test_load_static_single_failure_fails_all() {
        let chain = MockChain::new();
        let vault = addr(0x21);
        chain.seed_vault(&vault, &VaultFixture::default());
        chain.fail_call(&vault, selectors::START_TIME);

        assert!(block_on(load_static(&chain, &vault)).is_err());
    }

    #[test]
    fn test_load_static_rejects_unlock_before_start() {
        let chain = MockChain::new();
        let vault = addr(0x21);
        chain.seed_vault(&vault, &VaultFixture { start_time: 500, unlock_time: 100, ..Default::default() });

        assert!(matches!(
            block_on(load_static(&chain, &vault)),
            Err(LockerError::Decode(DecodeError::Inconsistent { .. }))
        ));
    }

    #[test]
    fn test_refresh_live_failure_keeps_previous_snapshot() {
        let chain = MockChain::new();
        let vault = addr(0x21);
        chain.seed_vault(&vault, &VaultFixture { can_withdraw: true, ..Default::default() });
        chain.set_balance(&vault, 3_000_000_000_000_000_000);

        let mut record = block_on(load_static(&chain, &vault)).unwrap();
        block_on(refresh_live(&chain, &mut record, 10)).unwrap();
        let before = record.live.clone();
        assert!(before.as_ref().unwrap().can_withdraw);
        assert_eq!(
            before.as_ref().unwrap().locked_balance,
            Some(BigUint::from(3_000_000_000_000_000_000u128))
        );

        chain.fail_call(&vault, selectors::PRICE_DETAIL);
        assert!(block_on(refresh_live(&chain, &mut record, 20)).is_err());
        assert_eq!(record.live, before);
    }

    #[test]
    fn test_token_balance_uses_lock_token_contract() {
        let chain = MockChain::new();
        let vault = addr(0x21);
        let hex = LockAsset::HEX.lock_token_address();
        chain.seed_vault(&vault, &VaultFixture { is_native: false, lock_token: hex, ..Default::default() });
        chain.set_token_balance(&hex, &vault, 250_000_000);

        let record = block_on(load_static(&chain, &vault)).unwrap();
        let balance = block_on(fetch_locked_balance(&chain, &record)).unwrap();
        assert_eq!(balance, BigUint::from(250_000_000u64));
    }

    #[test]
    fn test_balance_failure_does_not_fail_snapshot() {
        let chain = MockChain::new();
        let vault = addr(0x21);
        // Token vault with no balanceOf answer
        chain.seed_vault(&vault, &VaultFixture { is_native: false, lock_token: addr(0x99), ..Default::default() });

        let record = block_on(load_static(&chain, &vault)).unwrap();
        let snapshot = block_on(fetch_live(&chain, &record, 0)).unwrap();
        assert_eq!(snapshot.locked_balance, None);
    }

    #[test]
    fn test_discover_owned() {
        let chain = MockChain::new();
        let factory = addr(0xfa);
        chain.set_vaults_of(&factory, &OWNER, &[addr(1), addr(2)]);

        let found = block_on(discover_owned(&chain, &factory, &OWNER)).unwrap();
        assert_eq!(found, vec![addr(1), addr(2)]);
    }

    #[test]
    fn test_check_network() {
        let chain = MockChain::new();
        assert!(block_on(check_network(&chain, 369)).unwrap());
        chain.set_chain_id(1);
        assert!(!block_on(check_network(&chain, 369)).unwrap());
    }
}
