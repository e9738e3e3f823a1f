//! Deployment configuration
//!
//! Passed as the optional init / upgrade argument. Missing fields fall back to
//! the defaults in `constants.rs`. The active config is persisted so an upgrade
//! without an argument keeps the previous endpoints.

use candid::{CandidType, Deserialize};
use serde::Serialize;
use std::cell::RefCell;
use crate::types::Address;
use super::constants::*;
use super::errors::{Result, ValidationError};

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LockerConfig {
    pub primary_rpc: String,
    pub fallback_rpcs: Vec<String>,
    pub chain_id: u64,
    pub factory: String,
    pub max_response_bytes: u64,
    pub outcall_cycles: u128,
}

impl Default for LockerConfig {
    fn default() -> Self {
        LockerConfig {
            primary_rpc: DEFAULT_PRIMARY_RPC.to_string(),
            fallback_rpcs: DEFAULT_FALLBACK_RPCS.iter().map(|s| s.to_string()).collect(),
            chain_id: EXPECTED_CHAIN_ID,
            factory: FACTORY_ADDRESS.to_string(),
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            outcall_cycles: DEFAULT_OUTCALL_CYCLES,
        }
    }
}

impl LockerConfig {
    pub fn validate(&self) -> Result<()> {
        Address::parse(&self.factory)?;

        if self.fallback_rpcs.is_empty() {
            return Err(invalid("fallback cluster needs at least one endpoint"));
        }

        for url in std::iter::once(&self.primary_rpc).chain(self.fallback_rpcs.iter()) {
            if !url.starts_with("https://") {
                return Err(invalid(&format!("endpoint {} is not an https URL", url)));
            }
        }

        if self.max_response_bytes == 0 {
            return Err(invalid("max_response_bytes must be positive"));
        }

        Ok(())
    }

    /// Factory address, already validated on install
    pub fn factory_address(&self) -> Result<Address> {
        Address::parse(&self.factory)
    }
}

fn invalid(reason: &str) -> super::errors::LockerError {
    ValidationError::InvalidConfig { reason: reason.to_string() }.into()
}

thread_local! {
    static CONFIG: RefCell<LockerConfig> = RefCell::new(LockerConfig::default());
}

/// Validate and activate a config
pub fn install(config: LockerConfig) -> Result<()> {
    config.validate()?;
    CONFIG.with(|c| *c.borrow_mut() = config);
    Ok(())
}

pub fn current() -> LockerConfig {
    CONFIG.with(|c| c.borrow().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::errors::LockerError;

    #[test]
    fn test_default_config_is_valid() {
        assert!(LockerConfig::default().validate().is_ok());
        assert_eq!(LockerConfig::default().chain_id, 369);
    }

    #[test]
    fn test_rejects_empty_fallback_cluster() {
        let config = LockerConfig { fallback_rpcs: vec![], ..Default::default() };
        assert!(matches!(
            config.validate(),
            Err(LockerError::Validation(ValidationError::InvalidConfig { .. }))
        ));
    }

    #[test]
    fn test_rejects_plain_http() {
        let config = LockerConfig {
            primary_rpc: "http://localhost:8545".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_factory() {
        let config = LockerConfig { factory: "0x1234".to_string(), ..Default::default() };
        assert!(matches!(
            config.validate(),
            Err(LockerError::Validation(ValidationError::InvalidAddress { .. }))
        ));
    }

    #[test]
    fn test_install_keeps_previous_on_error() {
        let good = LockerConfig {
            primary_rpc: "https://example.org/rpc".to_string(),
            ..Default::default()
        };
        install(good.clone()).unwrap();

        let bad = LockerConfig { fallback_rpcs: vec![], ..Default::default() };
        assert!(install(bad).is_err());
        assert_eq!(current(), good);
    }
}
