//! Vault registry
//!
//! Per-account ordered list of lower-cased vault addresses, persisted as a JSON
//! array under `generic-vaults-<account>`. Order is first-seen order; entries are
//! never removed.

use ic_stable_structures::Memory;
use crate::infrastructure::errors::Result;
use crate::infrastructure::log;
use crate::infrastructure::stable_storage::{vault_list_key, PreferenceStore};
use crate::types::Address;

/// Tracked addresses for `account`; unreadable or non-array values read as empty
pub fn tracked_addresses<M: Memory>(prefs: &PreferenceStore<M>, account: &Address) -> Vec<String> {
    let Some(raw) = prefs.get(&vault_list_key(&account.to_hex())) else {
        return Vec::new();
    };

    match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| item.as_str().map(|s| s.to_lowercase()))
            .collect(),
        _ => {
            log!("⚠️ Ignoring unreadable vault list for {}", account);
            Vec::new()
        }
    }
}

fn store<M: Memory>(prefs: &mut PreferenceStore<M>, account: &Address, list: &[String]) {
    match serde_json::to_string(list) {
        Ok(json) => prefs.set(&vault_list_key(&account.to_hex()), json),
        Err(e) => log!("❌ Failed to encode vault list for {}: {}", account, e),
    }
}

/// Append every address not yet tracked; returns how many were new
pub fn merge_discovered<M: Memory>(
    prefs: &mut PreferenceStore<M>,
    account: &Address,
    discovered: &[Address],
) -> usize {
    let mut list = tracked_addresses(prefs, account);
    let before = list.len();

    for address in discovered {
        let lower = address.to_hex();
        if !list.contains(&lower) {
            list.push(lower);
        }
    }

    let added = list.len() - before;
    if added > 0 {
        store(prefs, account, &list);
    }
    added
}

/// Track one address; `false` when it was already tracked
pub fn save_address<M: Memory>(prefs: &mut PreferenceStore<M>, account: &Address, vault: &Address) -> bool {
    merge_discovered(prefs, account, std::slice::from_ref(vault)) == 1
}

/// Validate user input and track it; nothing is stored on rejection
pub fn add_manual<M: Memory>(prefs: &mut PreferenceStore<M>, account: &Address, input: &str) -> Result<Address> {
    let vault = Address::parse(input)?;
    if !save_address(prefs, account, &vault) {
        log!("ℹ️ {} already tracked for {}", vault, account);
    }
    Ok(vault)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::errors::{LockerError, ValidationError};
    use crate::test_support::{addr, OWNER};
    use ic_stable_structures::DefaultMemoryImpl;

    fn prefs() -> PreferenceStore<DefaultMemoryImpl> {
        PreferenceStore::init(DefaultMemoryImpl::default())
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut p = prefs();
        let found = [addr(1), addr(2)];

        assert_eq!(merge_discovered(&mut p, &OWNER, &found), 2);
        assert_eq!(merge_discovered(&mut p, &OWNER, &found), 0);
        assert_eq!(tracked_addresses(&p, &OWNER), vec![addr(1).to_hex(), addr(2).to_hex()]);
    }

    #[test]
    fn test_merge_keeps_first_seen_order() {
        let mut p = prefs();
        merge_discovered(&mut p, &OWNER, &[addr(3)]);
        merge_discovered(&mut p, &OWNER, &[addr(1), addr(3), addr(2)]);
        assert_eq!(
            tracked_addresses(&p, &OWNER),
            vec![addr(3).to_hex(), addr(1).to_hex(), addr(2).to_hex()]
        );
    }

    #[test]
    fn test_manual_add_rejection_leaves_list_unchanged() {
        let mut p = prefs();
        merge_discovered(&mut p, &OWNER, &[addr(1)]);

        let result = add_manual(&mut p, &OWNER, "0x123");
        assert!(matches!(
            result,
            Err(LockerError::Validation(ValidationError::InvalidAddress { .. }))
        ));
        assert_eq!(tracked_addresses(&p, &OWNER), vec![addr(1).to_hex()]);
    }

    #[test]
    fn test_manual_add_normalizes_case() {
        let mut p = prefs();
        let vault = add_manual(&mut p, &OWNER, " 0xABCDEFabcdefABCDEFabcdefABCDEFabcdefABCD ").unwrap();
        assert_eq!(tracked_addresses(&p, &OWNER), vec![vault.to_hex()]);
        assert_eq!(vault.to_hex(), "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd");

        // Second add is a no-op
        add_manual(&mut p, &OWNER, "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd").unwrap();
        assert_eq!(tracked_addresses(&p, &OWNER).len(), 1);
    }

    #[test]
    fn test_lists_are_per_account() {
        let mut p = prefs();
        merge_discovered(&mut p, &OWNER, &[addr(1)]);
        assert!(tracked_addresses(&p, &addr(0x77)).is_empty());
    }

    #[test]
    fn test_garbage_value_reads_empty() {
        let mut p = prefs();
        p.set(&vault_list_key(&OWNER.to_hex()), "{not json".to_string());
        assert!(tracked_addresses(&p, &OWNER).is_empty());

        p.set(&vault_list_key(&OWNER.to_hex()), "{\"a\":1}".to_string());
        assert!(tracked_addresses(&p, &OWNER).is_empty());
    }
}
