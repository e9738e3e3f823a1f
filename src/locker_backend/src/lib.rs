//! Vault Locker Backend - Numbered Zones
//!
//! Read side of the price-or-time vault lockers on PulseChain: tracks each
//! connected account's vaults, keeps their live state fresh and derives the
//! global price display. Wallets sign in the browser; this canister only
//! prepares calldata and confirms receipts.
//!
//! Every endpoint except the outcall transform requires an authenticated
//! caller. Sessions and display preferences belong to that caller.
//!
//! Architecture:
//! 1_CRITICAL_OPERATIONS - Vault creation, withdraw/rescue, confirmation, scheduler, sessions
//! 2_CRITICAL_DATA - Vault registry, vault state, state loader, session context
//! 3_PRICE_FEEDS - Dual-pair price feeds and selection
//! 4_RPC_ACCESS - ABI codec, JSON-RPC over HTTPS outcalls, resilient call
//! 5_INFORMATIONAL - Display projections and countdowns
//! 6_INFRASTRUCTURE - Constants, errors, config, logging, math, stable storage

// Import numbered modules with explicit paths
#[path = "1_CRITICAL_OPERATIONS/mod.rs"]
mod critical_operations_1;
use critical_operations_1 as _1_CRITICAL_OPERATIONS;

#[path = "2_CRITICAL_DATA/mod.rs"]
mod critical_data_2;
use critical_data_2 as _2_CRITICAL_DATA;

#[path = "3_PRICE_FEEDS/mod.rs"]
mod price_feeds_3;
use price_feeds_3 as _3_PRICE_FEEDS;

#[path = "4_RPC_ACCESS/mod.rs"]
mod rpc_access_4;
use rpc_access_4 as _4_RPC_ACCESS;

#[path = "5_INFORMATIONAL/mod.rs"]
mod informational_5;
use informational_5 as _5_INFORMATIONAL;

#[path = "6_INFRASTRUCTURE/mod.rs"]
mod infrastructure_6;
use infrastructure_6 as infrastructure;

mod types;

#[cfg(test)]
mod test_support;

use candid::candid_method;
use ic_cdk::api::management_canister::http_request::{HttpResponse, TransformArgs};
use ic_cdk::{init, post_upgrade, query, update};
use _1_CRITICAL_OPERATIONS::sessions::{self, ConnectReport};
use _1_CRITICAL_OPERATIONS::{CreateOutcome, CreateVaultArgs, RescueTarget, TransactionRequest};
use _2_CRITICAL_DATA::{RefreshReport, RestoreReport};
use _5_INFORMATIONAL::{GlobalPriceView, VaultView};
use infrastructure::stable_storage::{self, Theme};
use infrastructure::{log, require_caller, EventRecord, LockerConfig, Result};
use types::{Address, LockAsset};

// ===== SESSIONS =====

#[update]
#[candid_method(update)]
async fn connect(account: String, narrow_viewport: bool) -> Result<ConnectReport> {
    let caller = require_caller()?;
    sessions::connect(caller, &account, narrow_viewport).await
}

#[update]
#[candid_method(update)]
fn disconnect(account: String) -> Result<bool> {
    let caller = require_caller()?;
    let account = Address::parse(&account)?;
    sessions::disconnect(caller, &account)
}

#[query]
#[candid_method(query)]
fn get_connected_accounts() -> Result<Vec<String>> {
    let caller = require_caller()?;
    Ok(sessions::connected_accounts(caller))
}

// ===== VAULTS =====

#[update]
#[candid_method(update)]
async fn restore_vaults(account: String) -> Result<RestoreReport> {
    let session = sessions::session(require_caller()?, &account)?;
    Ok(session.restore_vaults().await)
}

#[update]
#[candid_method(update)]
async fn add_vault(account: String, vault: String) -> Result<String> {
    let session = sessions::session(require_caller()?, &account)?;
    let address = session.add_vault(&vault).await?;
    Ok(address.to_hex())
}

#[update]
#[candid_method(update)]
async fn refresh_vaults(account: String) -> Result<RefreshReport> {
    let session = sessions::session(require_caller()?, &account)?;
    Ok(session.refresh_all().await)
}

#[query]
#[candid_method(query)]
fn get_vaults(account: String) -> Result<Vec<VaultView>> {
    let caller = require_caller()?;
    let session = sessions::session(caller, &account)?;
    let scope = caller.to_text();
    let prefs = session.prefs().borrow();
    let views = session
        .vaults()
        .iter()
        .map(|record| {
            let collapsed = prefs.is_collapsed(&scope, &record.address.to_hex());
            _5_INFORMATIONAL::vault_view(record, session.account(), collapsed)
        })
        .collect();
    Ok(views)
}

#[update]
#[candid_method(update)]
fn set_collapsed(vault: String, collapsed: bool) -> Result<()> {
    let caller = require_caller()?;
    let vault = Address::parse(&vault)?;
    stable_storage::preferences()
        .borrow_mut()
        .set_collapsed(&caller.to_text(), &vault.to_hex(), collapsed);
    Ok(())
}

// ===== PRICE FEEDS =====

#[update]
#[candid_method(update)]
async fn select_asset(account: String, asset: LockAsset) -> Result<Option<GlobalPriceView>> {
    let session = sessions::session(require_caller()?, &account)?;
    session.select_asset(asset).await;
    Ok(session.global_price().as_ref().map(_5_INFORMATIONAL::global_price_view))
}

#[query]
#[candid_method(query)]
fn get_global_price(account: String) -> Result<Option<GlobalPriceView>> {
    let session = sessions::session(require_caller()?, &account)?;
    Ok(session.global_price().as_ref().map(_5_INFORMATIONAL::global_price_view))
}

// ===== TRANSACTIONS =====

#[query]
#[candid_method(query)]
fn prepare_create_vault(args: CreateVaultArgs) -> Result<TransactionRequest> {
    require_caller()?;
    let factory = infrastructure::config::current().factory_address()?;
    _1_CRITICAL_OPERATIONS::prepare_create_vault(&args, &factory, infrastructure::clock::now_secs())
}

#[update]
#[candid_method(update)]
async fn confirm_create_vault(account: String, tx_hash: String) -> Result<CreateOutcome> {
    let session = sessions::session(require_caller()?, &account)?;
    _1_CRITICAL_OPERATIONS::confirm_create_vault(&session, &tx_hash).await
}

#[query]
#[candid_method(query)]
fn prepare_withdraw(account: String, vault: String) -> Result<TransactionRequest> {
    let session = sessions::session(require_caller()?, &account)?;
    let vault = Address::parse(&vault)?;
    _1_CRITICAL_OPERATIONS::prepare_withdraw(&session, &vault)
}

#[query]
#[candid_method(query)]
fn prepare_rescue(account: String, vault: String, target: String) -> Result<TransactionRequest> {
    let session = sessions::session(require_caller()?, &account)?;
    let vault = Address::parse(&vault)?;
    let target = RescueTarget::parse(&target)?;
    _1_CRITICAL_OPERATIONS::prepare_rescue(&session, &vault, &target)
}

#[update]
#[candid_method(update)]
async fn confirm_transaction(account: String, tx_hash: String) -> Result<RefreshReport> {
    let session = sessions::session(require_caller()?, &account)?;
    _1_CRITICAL_OPERATIONS::confirmation::confirm_transaction(&session, &tx_hash).await
}

// ===== PREFERENCES =====

#[query]
#[candid_method(query)]
fn get_theme() -> Result<Theme> {
    let caller = require_caller()?;
    Ok(stable_storage::preferences().borrow().theme(&caller.to_text()))
}

#[update]
#[candid_method(update)]
fn set_theme(theme: Theme) -> Result<()> {
    let caller = require_caller()?;
    stable_storage::preferences().borrow_mut().set_theme(&caller.to_text(), theme);
    Ok(())
}

// ===== DIAGNOSTICS =====

#[query]
#[candid_method(query)]
fn get_recent_events() -> Result<Vec<EventRecord>> {
    require_caller()?;
    Ok(infrastructure::recent_events())
}

#[query]
#[candid_method(query)]
fn get_config() -> Result<LockerConfig> {
    require_caller()?;
    Ok(infrastructure::config::current())
}

/// Strips headers from outcall responses so replicas agree
#[query]
#[candid_method(query)]
fn transform_rpc_response(args: TransformArgs) -> HttpResponse {
    _4_RPC_ACCESS::outcalls::transform_response(args)
}

// ===== INITIALIZATION =====

fn install_config(config: Option<LockerConfig>) {
    let config = config
        .or_else(stable_storage::load_config)
        .unwrap_or_default();

    if let Err(e) = infrastructure::config::install(config.clone()) {
        ic_cdk::trap(&format!("Rejected config: {}", e));
    }
    stable_storage::save_config(&config);

    log!("✅ Config active: chain {}, factory {}, {} fallback endpoint(s)",
        config.chain_id, config.factory, config.fallback_rpcs.len());
}

#[init]
fn init(config: Option<LockerConfig>) {
    log!("===================================");
    log!("Vault Locker Backend Initialized");
    log!("===================================");
    install_config(config);
}

/// Sessions and their timers do not survive an upgrade; clients reconnect
#[post_upgrade]
fn post_upgrade(config: Option<LockerConfig>) {
    log!("===================================");
    log!("Vault Locker Backend Post-Upgrade");
    log!("===================================");
    install_config(config);
}

// ===== CANDID EXPORT =====

ic_cdk::export_candid!();
