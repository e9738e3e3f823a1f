//! Lockable assets and their price feeds
//!
//! Every feed pair quotes the lock asset as token0.

use candid::{CandidType, Deserialize};
use serde::Serialize;
use crate::infrastructure::constants::DEFAULT_TOKEN_DECIMALS;
use super::Address;

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LockAsset {
    PLS,
    PDAI,
    HEX,
}

impl LockAsset {
    pub fn all() -> [LockAsset; 3] {
        [LockAsset::PLS, LockAsset::PDAI, LockAsset::HEX]
    }

    pub fn label(&self) -> &'static str {
        match self {
            LockAsset::PLS => "PLS",
            LockAsset::PDAI => "pDAI",
            LockAsset::HEX => "HEX",
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, LockAsset::PLS)
    }

    pub fn lock_decimals(&self) -> u32 {
        match self {
            LockAsset::PLS | LockAsset::PDAI => 18,
            LockAsset::HEX => 8,
        }
    }

    /// Address passed to the factory; zero for the native asset
    pub fn lock_token(&self) -> &'static str {
        match self {
            LockAsset::PLS => "0x0000000000000000000000000000000000000000",
            LockAsset::PDAI => "0x6b175474e89094c44da98b954eedeac495271d0f",
            LockAsset::HEX => "0x2b591e99afe9f32eaa6214f7b7629768c40eeb39",
        }
    }

    pub fn lock_token_address(&self) -> Address {
        Address::parse(self.lock_token()).unwrap_or(Address::ZERO)
    }

    /// Reverse lookup used to label vaults read from chain
    pub fn from_lock_token(token: &Address, is_native: bool) -> Option<LockAsset> {
        if is_native {
            return Some(LockAsset::PLS);
        }
        LockAsset::all()
            .into_iter()
            .find(|asset| !asset.is_native() && asset.lock_token_address() == *token)
    }

    pub fn feeds(&self) -> FeedConfig {
        let (primary, backup) = match self {
            LockAsset::PLS => (
                PairConfig::new("0xe56043671df55de5cdf8459710433c10324de0ae", 18),
                PairConfig::new("0x146e1f1e060e5b5016db0d118d2c5a11a240ae32", 18),
            ),
            LockAsset::PDAI => (
                PairConfig::new("0xfc64556faa683e6087f425819c7ca3c558e13ac1", 18),
                PairConfig::new("0x1d2be6eff95ac5c380a8d6a6143b6a97dd9d8712", 18),
            ),
            LockAsset::HEX => (
                PairConfig::new("0xc475332e92561cd58f278e4e2ed76c17d5b50f05", 6),
                PairConfig::new("0x6f1747370b1cacb911ad6d4477b718633db328c8", 18),
            ),
        };
        FeedConfig { asset: *self, lock_decimals: self.lock_decimals(), primary, backup }
    }
}

/// Decimals of a vault's lock token, falling back to 18 for unknown tokens
pub fn token_decimals(token: &Address, is_native: bool) -> u32 {
    LockAsset::from_lock_token(token, is_native)
        .map(|asset| asset.lock_decimals())
        .unwrap_or(DEFAULT_TOKEN_DECIMALS)
}

/// One liquidity pair used as a price source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairConfig {
    pub pair: &'static str,
    pub quote_decimals: u32,
    pub lock_is_token0: bool,
}

impl PairConfig {
    const fn new(pair: &'static str, quote_decimals: u32) -> Self {
        PairConfig { pair, quote_decimals, lock_is_token0: true }
    }

    pub fn address(&self) -> Address {
        Address::parse(self.pair).unwrap_or(Address::ZERO)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedConfig {
    pub asset: LockAsset,
    pub lock_decimals: u32,
    pub primary: PairConfig,
    pub backup: PairConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_addresses_parse() {
        for asset in LockAsset::all() {
            let feeds = asset.feeds();
            assert!(!feeds.primary.address().is_zero());
            assert!(!feeds.backup.address().is_zero());
            assert_eq!(asset.is_native(), asset.lock_token_address().is_zero());
        }
    }

    #[test]
    fn test_reverse_lookup() {
        let hex = LockAsset::HEX.lock_token_address();
        assert_eq!(LockAsset::from_lock_token(&hex, false), Some(LockAsset::HEX));
        assert_eq!(LockAsset::from_lock_token(&Address::ZERO, true), Some(LockAsset::PLS));
        assert_eq!(LockAsset::from_lock_token(&Address([7u8; 20]), false), None);
    }

    #[test]
    fn test_token_decimals() {
        assert_eq!(token_decimals(&LockAsset::HEX.lock_token_address(), false), 8);
        assert_eq!(token_decimals(&Address([7u8; 20]), false), 18);
        assert_eq!(token_decimals(&Address::ZERO, true), 18);
    }

    #[test]
    fn test_hex_primary_quotes_six_decimals() {
        let feeds = LockAsset::HEX.feeds();
        assert_eq!(feeds.lock_decimals, 8);
        assert_eq!(feeds.primary.quote_decimals, 6);
        assert_eq!(feeds.backup.quote_decimals, 18);
    }
}
