//! In-memory chain used by unit tests

use num_bigint::BigUint;
use std::cell::{Cell, RefCell};
use futures::channel::oneshot;
use std::collections::{HashMap, HashSet, VecDeque};
use crate::_4_RPC_ACCESS::abi::{self, selectors, Selector, Token};
use crate::_4_RPC_ACCESS::json_rpc::{ChainReader, Source, TxReceipt};
use crate::infrastructure::errors::{LockerError, Result, RpcError};
use crate::types::Address;

pub const OWNER: Address = Address([0x0a; 20]);
pub const STRANGER: Address = Address([0x0b; 20]);

pub fn addr(byte: u8) -> Address {
    Address([byte; 20])
}

#[derive(Default)]
pub struct MockChain {
    exact: RefCell<HashMap<(Address, Vec<u8>), Vec<u8>>>,
    by_selector: RefCell<HashMap<(Address, Selector), Vec<u8>>>,
    failing: RefCell<HashSet<(Address, Selector)>>,
    held: RefCell<HashMap<(Address, Selector), oneshot::Receiver<()>>>,
    balances: RefCell<HashMap<Address, BigUint>>,
    receipts: RefCell<HashMap<String, VecDeque<Option<TxReceipt>>>>,
    chain_id: Cell<u64>,
    primary_down: Cell<bool>,
    fallback_down: Cell<bool>,
    primary_calls: Cell<u32>,
    fallback_calls: Cell<u32>,
    pauses: RefCell<Vec<u64>>,
}

impl MockChain {
    pub fn new() -> Self {
        let chain = MockChain::default();
        chain.chain_id.set(369);
        chain
    }

    // ===== Seeding =====

    pub fn set_call(&self, to: &Address, selector: Selector, response: Vec<u8>) {
        self.by_selector.borrow_mut().insert((*to, selector), response);
    }

    /// Response for one exact calldata (selector plus arguments)
    pub fn set_exact(&self, to: &Address, calldata: Vec<u8>, response: Vec<u8>) {
        self.exact.borrow_mut().insert((*to, calldata), response);
    }

    pub fn set_uint(&self, to: &Address, selector: Selector, value: u128) {
        self.set_call(to, selector, abi::uint_word(value));
    }

    pub fn set_bool(&self, to: &Address, selector: Selector, value: bool) {
        self.set_call(to, selector, abi::bool_word(value));
    }

    pub fn set_address(&self, to: &Address, selector: Selector, value: &Address) {
        self.set_call(to, selector, abi::address_word(value));
    }

    pub fn fail_call(&self, to: &Address, selector: Selector) {
        self.failing.borrow_mut().insert((*to, selector));
    }

    /// Park the next matching call until the returned sender fires
    pub fn hold_call(&self, to: &Address, selector: Selector) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.held.borrow_mut().insert((*to, selector), rx);
        tx
    }

    pub fn heal_call(&self, to: &Address, selector: Selector) {
        self.failing.borrow_mut().remove(&(*to, selector));
    }

    pub fn set_reserves(&self, pair: &Address, reserve0: u128, reserve1: u128) {
        let mut data = abi::uint_word(reserve0);
        data.extend(abi::uint_word(reserve1));
        data.extend(abi::uint_word(0));
        self.set_call(pair, selectors::GET_RESERVES, data);
    }

    pub fn set_vaults_of(&self, factory: &Address, owner: &Address, vaults: &[Address]) {
        let mut data = abi::uint_word(32);
        data.extend(abi::uint_word(vaults.len() as u128));
        for vault in vaults {
            data.extend(abi::address_word(vault));
        }
        let calldata = abi::encode_call(selectors::VAULTS_OF, &[Token::Address(*owner)]);
        self.set_exact(factory, calldata, data);
    }

    pub fn set_token_balance(&self, token: &Address, holder: &Address, value: u128) {
        let calldata = abi::encode_call(selectors::BALANCE_OF, &[Token::Address(*holder)]);
        self.set_exact(token, calldata, abi::uint_word(value));
    }

    pub fn set_balance(&self, account: &Address, value: u128) {
        self.balances.borrow_mut().insert(*account, BigUint::from(value));
    }

    /// Successive polls return successive entries; the last one repeats
    pub fn set_receipts(&self, tx_hash: &str, polls: Vec<Option<TxReceipt>>) {
        self.receipts.borrow_mut().insert(tx_hash.to_string(), polls.into());
    }

    pub fn set_chain_id(&self, id: u64) {
        self.chain_id.set(id);
    }

    pub fn set_primary_down(&self, down: bool) {
        self.primary_down.set(down);
    }

    pub fn set_fallback_down(&self, down: bool) {
        self.fallback_down.set(down);
    }

    // ===== Inspection =====

    pub fn primary_calls(&self) -> u32 {
        self.primary_calls.get()
    }

    pub fn fallback_calls(&self) -> u32 {
        self.fallback_calls.get()
    }

    pub fn pauses(&self) -> Vec<u64> {
        self.pauses.borrow().clone()
    }

    fn route(&self, source: Source) -> Result<()> {
        let (counter, down, name) = match source {
            Source::Primary => (&self.primary_calls, self.primary_down.get(), "mock-primary"),
            Source::Fallback => (&self.fallback_calls, self.fallback_down.get(), "mock-fallback"),
        };
        counter.set(counter.get() + 1);
        if down {
            return Err(RpcError::Transport { endpoint: name.to_string(), reason: "unreachable".to_string() }.into());
        }
        Ok(())
    }
}

fn reverted() -> LockerError {
    RpcError::Node { code: 3, message: "execution reverted".to_string() }.into()
}

impl ChainReader for MockChain {
    async fn call(&self, source: Source, to: &Address, data: &[u8]) -> Result<Vec<u8>> {
        self.route(source)?;

        if data.len() < 4 {
            return Err(reverted());
        }
        let mut selector = [0u8; 4];
        selector.copy_from_slice(&data[..4]);

        let held = self.held.borrow_mut().remove(&(*to, selector));
        if let Some(gate) = held {
            let _ = gate.await;
        }

        if self.failing.borrow().contains(&(*to, selector)) {
            return Err(reverted());
        }
        if let Some(response) = self.exact.borrow().get(&(*to, data.to_vec())) {
            return Ok(response.clone());
        }
        self.by_selector
            .borrow()
            .get(&(*to, selector))
            .cloned()
            .ok_or_else(reverted)
    }

    async fn balance(&self, source: Source, account: &Address) -> Result<BigUint> {
        self.route(source)?;
        Ok(self.balances.borrow().get(account).cloned().unwrap_or_default())
    }

    async fn receipt(&self, source: Source, tx_hash: &str) -> Result<Option<TxReceipt>> {
        self.route(source)?;
        let mut receipts = self.receipts.borrow_mut();
        let Some(queue) = receipts.get_mut(tx_hash) else {
            return Ok(None);
        };
        if queue.len() > 1 {
            Ok(queue.pop_front().flatten())
        } else {
            Ok(queue.front().cloned().flatten())
        }
    }

    async fn chain_id(&self, source: Source) -> Result<u64> {
        self.route(source)?;
        Ok(self.chain_id.get())
    }

    async fn pause(&self, millis: u64) {
        self.pauses.borrow_mut().push(millis);
    }
}

/// On-chain state of one vault
pub struct VaultFixture {
    pub owner: Address,
    pub lock_token: Address,
    pub is_native: bool,
    pub threshold_1e18: u128,
    pub start_time: u64,
    pub unlock_time: u64,
    pub withdrawn: bool,
    pub current_price_1e18: u128,
    pub price_met: bool,
    pub time_met: bool,
    pub can_withdraw: bool,
}

impl Default for VaultFixture {
    fn default() -> Self {
        VaultFixture {
            owner: OWNER,
            lock_token: Address::ZERO,
            is_native: true,
            threshold_1e18: 2_000_000_000_000_000_000,
            start_time: 1_000,
            unlock_time: 1_000 + 86_400,
            withdrawn: false,
            current_price_1e18: 1_000_000_000_000_000_000,
            price_met: false,
            time_met: false,
            can_withdraw: false,
        }
    }
}

impl MockChain {
    pub fn seed_vault(&self, vault: &Address, f: &VaultFixture) {
        self.set_address(vault, selectors::OWNER, &f.owner);
        self.set_address(vault, selectors::LOCK_TOKEN, &f.lock_token);
        self.set_bool(vault, selectors::IS_NATIVE, f.is_native);
        self.set_uint(vault, selectors::PRICE_THRESHOLD_1E18, f.threshold_1e18);
        self.set_uint(vault, selectors::START_TIME, f.start_time as u128);
        self.set_uint(vault, selectors::UNLOCK_TIME, f.unlock_time as u128);
        self.set_bool(vault, selectors::WITHDRAWN, f.withdrawn);
        self.set_uint(vault, selectors::CURRENT_PRICE_1E18, f.current_price_1e18);
        self.set_bool(vault, selectors::PRICE_CONDITION_MET, f.price_met);
        self.set_bool(vault, selectors::TIME_CONDITION_MET, f.time_met);
        self.set_bool(vault, selectors::CAN_WITHDRAW, f.can_withdraw);
        self.set_call(vault, selectors::PRICE_DETAIL, price_detail_words(f.current_price_1e18, true));
    }
}

/// `priceDetail` return data with the primary feed chosen
pub fn price_detail_words(price: u128, ok: bool) -> Vec<u8> {
    let mut data = Vec::new();
    for word in [
        abi::uint_word(if ok { price } else { 0 }),
        abi::bool_word(ok),
        abi::uint_word(price),
        abi::uint_word(1_000),
        abi::bool_word(ok),
        abi::uint_word(price),
        abi::uint_word(500),
        abi::bool_word(ok),
        abi::bool_word(ok),
        abi::bool_word(false),
        abi::bool_word(false),
    ] {
        data.extend(word);
    }
    data
}
