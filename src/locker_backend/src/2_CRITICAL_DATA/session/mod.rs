//! Session context
//!
//! Everything the client used to keep in globals (account, selected asset,
//! vault collection, last global price, network flag) lives on one session per
//! connected account. Interior mutability only; borrows are never held across
//! an await, so snapshots are always built first and assigned afterwards.

use candid::{CandidType, Deserialize};
use ic_stable_structures::Memory;
use serde::Serialize;
use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;
use crate::_3_PRICE_FEEDS::{refresh_global_price, GlobalPrice};
use crate::_4_RPC_ACCESS::json_rpc::ChainReader;
use crate::_5_INFORMATIONAL::countdown::compute_countdown;
use crate::infrastructure::clock::now_secs;
use crate::infrastructure::errors::{Result, SessionError};
use crate::infrastructure::stable_storage::PreferenceStore;
use crate::infrastructure::{log, record_event, EventLevel};
use crate::types::{Address, LockAsset};
use super::registry;
use super::vault_loader;
use super::vault_state::{VaultCollection, VaultRecord};

/// Outcome of a restore, with the status line the client shows
#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct RestoreReport {
    pub discovered: u64,
    pub added: u64,
    pub loaded: u64,
    pub discovery_failed: bool,
    pub message: String,
}

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshReport {
    pub refreshed: u64,
    pub failed: u64,
}

pub struct SessionParams {
    pub account: Address,
    pub factory: Address,
    pub expected_chain_id: u64,
    pub asset: LockAsset,
    pub narrow_viewport: bool,
}

pub struct Session<R: ChainReader, M: Memory> {
    account: Address,
    factory: Address,
    expected_chain_id: u64,
    narrow_viewport: bool,
    reader: R,
    prefs: Rc<RefCell<PreferenceStore<M>>>,
    asset: Cell<LockAsset>,
    vaults: RefCell<VaultCollection>,
    global: RefCell<Option<GlobalPrice>>,
    wrong_network: Cell<bool>,
    refreshing: Cell<bool>,
}

impl<R: ChainReader, M: Memory> Session<R, M> {
    pub fn new(params: SessionParams, reader: R, prefs: Rc<RefCell<PreferenceStore<M>>>) -> Self {
        Session {
            account: params.account,
            factory: params.factory,
            expected_chain_id: params.expected_chain_id,
            narrow_viewport: params.narrow_viewport,
            reader,
            prefs,
            asset: Cell::new(params.asset),
            vaults: RefCell::new(VaultCollection::new()),
            global: RefCell::new(None),
            wrong_network: Cell::new(false),
            refreshing: Cell::new(false),
        }
    }

    pub fn account(&self) -> &Address {
        &self.account
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn factory(&self) -> &Address {
        &self.factory
    }

    pub fn asset(&self) -> LockAsset {
        self.asset.get()
    }

    pub fn narrow_viewport(&self) -> bool {
        self.narrow_viewport
    }

    pub fn wrong_network(&self) -> bool {
        self.wrong_network.get()
    }

    pub fn prefs(&self) -> &Rc<RefCell<PreferenceStore<M>>> {
        &self.prefs
    }

    pub fn vaults(&self) -> Ref<'_, VaultCollection> {
        self.vaults.borrow()
    }

    pub fn vault(&self, address: &Address) -> Result<VaultRecord> {
        self.vaults
            .borrow()
            .get(address)
            .cloned()
            .ok_or_else(|| SessionError::UnknownVault { vault: address.to_hex() }.into())
    }

    pub fn global_price(&self) -> Option<GlobalPrice> {
        self.global.borrow().clone()
    }

    // ===== Refresh guard =====

    /// Claim the refresh slot; `false` when a refresh is already running
    pub fn try_begin_refresh(&self) -> bool {
        !self.refreshing.replace(true)
    }

    pub fn end_refresh(&self) {
        self.refreshing.set(false);
    }

    // ===== Network and prices =====

    /// Wrong network is flagged, not fatal
    pub async fn check_network(&self) {
        match vault_loader::check_network(&self.reader, self.expected_chain_id).await {
            Ok(ok) => self.wrong_network.set(!ok),
            Err(e) => record_event(EventLevel::Warning, "network", format!("chain id check failed: {}", e)),
        }
    }

    /// Recompute the global price for the selected asset
    ///
    /// A result for an asset that was deselected while the reads were in
    /// flight is dropped.
    pub async fn refresh_global(&self) {
        let global = refresh_global_price(&self.reader, self.asset.get(), now_secs()).await;
        if global.asset != self.asset.get() {
            log!("ℹ️ Dropping {} price, {} is selected now", global.asset.label(), self.asset.get().label());
            return;
        }
        *self.global.borrow_mut() = Some(global);
    }

    pub async fn select_asset(&self, asset: LockAsset) {
        self.asset.set(asset);
        self.refresh_global().await;
    }

    // ===== Vault loading =====

    /// Load a vault's static state unless it is already in the collection
    ///
    /// Returns whether the collection now holds the vault.
    pub async fn soft_load(&self, address: &Address) -> bool {
        if self.vaults.borrow().contains(address) {
            return true;
        }

        match vault_loader::load_static(&self.reader, address).await {
            Ok(record) => {
                self.vaults.borrow_mut().insert(record);
                true
            }
            Err(e) => {
                record_event(EventLevel::Warning, "load", format!("vault {} skipped: {}", address, e));
                false
            }
        }
    }

    /// Soft-load every tracked address
    pub async fn load_tracked(&self) -> u64 {
        let tracked = registry::tracked_addresses(&*self.prefs.borrow(), &self.account);
        let mut loaded = 0;

        for raw in tracked {
            let Ok(address) = Address::parse(&raw) else {
                log!("⚠️ Ignoring malformed tracked entry {}", raw);
                continue;
            };
            let was_loaded = self.vaults.borrow().contains(&address);
            if self.soft_load(&address).await && !was_loaded {
                loaded += 1;
            }
        }
        loaded
    }

    /// Discover on-chain, merge into the registry, load what is missing, refresh
    ///
    /// A failed discovery still loads the locally tracked list.
    pub async fn restore_vaults(&self) -> RestoreReport {
        let discovery = vault_loader::discover_owned(&self.reader, &self.factory, &self.account).await;

        let (discovered, added, discovery_error) = match discovery {
            Ok(found) => {
                let added = registry::merge_discovered(&mut *self.prefs.borrow_mut(), &self.account, &found);
                (found.len() as u64, added as u64, None)
            }
            Err(e) => {
                record_event(EventLevel::Warning, "restore", format!("discovery for {} failed: {}", self.account, e));
                (0, 0, Some(e))
            }
        };

        let loaded = self.load_tracked().await;
        self.refresh_all().await;

        let message = match &discovery_error {
            Some(e) => format!("Restore failed: {}", e),
            None if discovered == 0 && self.vaults.borrow().is_empty() => "No vaults found for this wallet.".to_string(),
            None if added > 0 => format!("Restored {} vault(s).", added),
            None => "All vaults already restored.".to_string(),
        };

        RestoreReport {
            discovered,
            added,
            loaded,
            discovery_failed: discovery_error.is_some(),
            message,
        }
    }

    /// Validate, track, load and refresh a manually entered address
    pub async fn add_vault(&self, input: &str) -> Result<Address> {
        let address = registry::add_manual(&mut *self.prefs.borrow_mut(), &self.account, input)?;
        self.soft_load(&address).await;
        self.refresh_all().await;
        Ok(address)
    }

    /// Track a vault this account just created
    pub async fn track_vault(&self, address: &Address) {
        registry::save_address(&mut *self.prefs.borrow_mut(), &self.account, address);
        self.soft_load(address).await;
        self.refresh_all().await;
    }

    // ===== Live refresh =====

    /// Refresh one vault; the previous snapshot stays on failure
    ///
    /// The collection is not borrowed across the reads: `refresh_live` runs on
    /// a copy of the record and its snapshot is applied to the current record
    /// afterwards. A vault dropped meanwhile is skipped.
    pub async fn refresh_one(&self, address: &Address) -> Result<()> {
        let mut refreshed = self.vault(address)?;
        vault_loader::refresh_live(&self.reader, &mut refreshed, now_secs()).await?;

        if let (Some(current), Some(snapshot)) = (self.vaults.borrow_mut().get_mut(address), refreshed.live) {
            current.apply_live(snapshot);
        }
        Ok(())
    }

    /// Sequential live refresh of every loaded vault
    pub async fn refresh_all(&self) -> RefreshReport {
        let mut report = RefreshReport::default();

        let addresses = self.vaults.borrow().addresses();
        for address in addresses {
            match self.refresh_one(&address).await {
                Ok(()) => report.refreshed += 1,
                Err(e) => {
                    report.failed += 1;
                    record_event(EventLevel::Warning, "refresh", format!("vault {} kept stale state: {}", address, e));
                }
            }
        }
        report
    }

    /// Recompute every countdown from cached times
    pub fn update_countdowns(&self, now: u64) {
        for record in self.vaults.borrow_mut().iter_mut() {
            record.countdown = Some(compute_countdown(record.start_time, record.unlock_time, now));
        }
    }

    /// Drop all per-session state
    pub fn clear(&self) {
        self.vaults.borrow_mut().clear();
        *self.global.borrow_mut() = None;
    }
}
