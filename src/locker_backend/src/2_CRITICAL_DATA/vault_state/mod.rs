//! Per-vault state
//!
//! Static fields are loaded once and never change. The live snapshot is
//! replaced wholesale on every successful refresh; a failed refresh leaves the
//! previous snapshot in place. `withdrawn` only ever goes from false to true.

use candid::{CandidType, Deserialize};
use num_bigint::BigUint;
use serde::Serialize;
use crate::_5_INFORMATIONAL::countdown::Countdown;
use crate::types::assets::token_decimals;
use crate::types::{Address, LockAsset};

pub use crate::_4_RPC_ACCESS::abi::PriceDetail;

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultStatus {
    Locked,
    Unlocked,
    Withdrawn,
}

/// Result of one joint live fetch
#[derive(Debug, Clone, PartialEq)]
pub struct LiveSnapshot {
    pub withdrawn: bool,
    pub can_withdraw: bool,
    pub price_met: bool,
    pub time_met: bool,
    pub current_price_1e18: BigUint,
    pub threshold_1e18: BigUint,
    pub price_detail: PriceDetail,
    /// Best effort; `None` when the balance read failed
    pub locked_balance: Option<BigUint>,
    pub fetched_at: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VaultRecord {
    pub address: Address,
    pub owner: Address,
    pub lock_token: Address,
    pub is_native: bool,
    pub withdrawn: bool,
    pub start_time: u64,
    pub unlock_time: u64,
    pub live: Option<LiveSnapshot>,
    pub countdown: Option<Countdown>,
}

impl VaultRecord {
    pub fn apply_live(&mut self, snapshot: LiveSnapshot) {
        self.withdrawn = self.withdrawn || snapshot.withdrawn;
        self.live = Some(snapshot);
    }

    pub fn status(&self) -> VaultStatus {
        if self.withdrawn {
            VaultStatus::Withdrawn
        } else if self.live.as_ref().map_or(false, |l| l.can_withdraw) {
            VaultStatus::Unlocked
        } else {
            VaultStatus::Locked
        }
    }

    /// Anyone but the owner only observes
    pub fn is_view_only(&self, account: &Address) -> bool {
        self.owner != *account
    }

    pub fn asset(&self) -> Option<LockAsset> {
        LockAsset::from_lock_token(&self.lock_token, self.is_native)
    }

    pub fn asset_label(&self) -> &'static str {
        match self.asset() {
            Some(asset) => asset.label(),
            None => "ERC20",
        }
    }

    pub fn token_decimals(&self) -> u32 {
        token_decimals(&self.lock_token, self.is_native)
    }
}

/// Insertion-ordered, unique by address
#[derive(Debug, Clone, Default)]
pub struct VaultCollection {
    records: Vec<VaultRecord>,
}

impl VaultCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.records.iter().any(|r| r.address == *address)
    }

    pub fn get(&self, address: &Address) -> Option<&VaultRecord> {
        self.records.iter().find(|r| r.address == *address)
    }

    pub fn get_mut(&mut self, address: &Address) -> Option<&mut VaultRecord> {
        self.records.iter_mut().find(|r| r.address == *address)
    }

    /// `false` (and no change) when the address is already present
    pub fn insert(&mut self, record: VaultRecord) -> bool {
        if self.contains(&record.address) {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.records.iter().map(|r| r.address).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VaultRecord> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut VaultRecord> {
        self.records.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
