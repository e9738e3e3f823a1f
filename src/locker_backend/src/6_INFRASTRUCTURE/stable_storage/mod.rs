//! Stable storage for upgrade persistence
//!
//! Two virtual memories behind one `MemoryManager`:
//! - `PREFERENCES` (id 0): the browser client's key/value store, same keys and
//!   string values (`generic-vaults-<account>`, `vaultCollapsed-<vault>`, `vault-theme`).
//!   Display preferences are stored under a per-caller scope (`<principal>/<key>`);
//!   vault lists stay keyed by account.
//! - `SETTINGS` (id 1): the active `LockerConfig` as JSON

use candid::{CandidType, Deserialize};
use ic_stable_structures::memory_manager::{MemoryId, MemoryManager, VirtualMemory};
use ic_stable_structures::{DefaultMemoryImpl, Memory, StableBTreeMap};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use super::config::LockerConfig;
use super::constants::{COLLAPSED_KEY_PREFIX, THEME_KEY, VAULT_LIST_KEY_PREFIX};
use super::logging::log;

pub type CanisterMemory = VirtualMemory<DefaultMemoryImpl>;

const PREFERENCES_MEMORY_ID: MemoryId = MemoryId::new(0);
const SETTINGS_MEMORY_ID: MemoryId = MemoryId::new(1);
const CONFIG_KEY: &str = "config";

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

/// String key/value store with the browser client's semantics
pub struct PreferenceStore<M: Memory> {
    map: StableBTreeMap<String, String, M>,
}

impl<M: Memory> PreferenceStore<M> {
    pub fn init(memory: M) -> Self {
        PreferenceStore { map: StableBTreeMap::init(memory) }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.map.get(&key.to_string())
    }

    pub fn set(&mut self, key: &str, value: String) {
        self.map.insert(key.to_string(), value);
    }

    pub fn remove(&mut self, key: &str) {
        self.map.remove(&key.to_string());
    }

    pub fn is_collapsed(&self, scope: &str, vault: &str) -> bool {
        self.get(&scoped_key(scope, &collapsed_key(vault))).as_deref() == Some("1")
    }

    pub fn set_collapsed(&mut self, scope: &str, vault: &str, collapsed: bool) {
        let value = if collapsed { "1" } else { "0" };
        self.set(&scoped_key(scope, &collapsed_key(vault)), value.to_string());
    }

    /// Anything but "light" reads as dark
    pub fn theme(&self, scope: &str) -> Theme {
        match self.get(&scoped_key(scope, THEME_KEY)).as_deref() {
            Some("light") => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn set_theme(&mut self, scope: &str, theme: Theme) {
        let value = match theme {
            Theme::Light => "light",
            Theme::Dark => "dark",
        };
        self.set(&scoped_key(scope, THEME_KEY), value.to_string());
    }
}

pub fn vault_list_key(account: &str) -> String {
    format!("{}{}", VAULT_LIST_KEY_PREFIX, account)
}

pub fn collapsed_key(vault: &str) -> String {
    format!("{}{}", COLLAPSED_KEY_PREFIX, vault)
}

pub fn scoped_key(scope: &str, key: &str) -> String {
    format!("{}/{}", scope, key)
}

thread_local! {
    static MEMORY_MANAGER: RefCell<MemoryManager<DefaultMemoryImpl>> =
        RefCell::new(MemoryManager::init(DefaultMemoryImpl::default()));

    static PREFERENCES: Rc<RefCell<PreferenceStore<CanisterMemory>>> = Rc::new(RefCell::new(
        PreferenceStore::init(MEMORY_MANAGER.with(|m| m.borrow().get(PREFERENCES_MEMORY_ID)))
    ));

    static SETTINGS: RefCell<StableBTreeMap<String, String, CanisterMemory>> = RefCell::new(
        StableBTreeMap::init(MEMORY_MANAGER.with(|m| m.borrow().get(SETTINGS_MEMORY_ID)))
    );
}

/// Shared handle to the canister's preference store
pub fn preferences() -> Rc<RefCell<PreferenceStore<CanisterMemory>>> {
    PREFERENCES.with(Rc::clone)
}

pub fn save_config(config: &LockerConfig) {
    match serde_json::to_string(config) {
        Ok(json) => {
            SETTINGS.with(|s| s.borrow_mut().insert(CONFIG_KEY.to_string(), json));
            log!("💾 Saved config ({} fallback endpoints)", config.fallback_rpcs.len());
        }
        Err(e) => {
            log!("⚠️ WARNING: Failed to serialize config: {}", e);
        }
    }
}

pub fn load_config() -> Option<LockerConfig> {
    let json = SETTINGS.with(|s| s.borrow().get(&CONFIG_KEY.to_string()))?;
    match serde_json::from_str(&json) {
        Ok(config) => Some(config),
        Err(e) => {
            log!("⚠️ Stored config unreadable, using defaults: {}", e);
            None
        }
    }
}
