//! Contract ABI codec
//!
//! Only the static shapes the vault, factory and pair contracts use:
//! address and uint256 arguments, word-sized returns, one dynamic `address[]`
//! return, and the `VaultCreated` event. Selectors are the precomputed first four
//! bytes of keccak256 over the canonical signature.

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};
use crate::infrastructure::errors::{DecodeError, Result};
use crate::types::Address;

pub const WORD: usize = 32;

pub type Selector = [u8; 4];

pub mod selectors {
    use super::Selector;

    // Pair
    pub const GET_RESERVES: Selector = [0x09, 0x02, 0xf1, 0xac];

    // ERC20
    pub const BALANCE_OF: Selector = [0x70, 0xa0, 0x82, 0x31];

    // Vault reads
    pub const OWNER: Selector = [0x8d, 0xa5, 0xcb, 0x5b];
    pub const LOCK_TOKEN: Selector = [0xbc, 0xa7, 0xa9, 0xe2];
    pub const IS_NATIVE: Selector = [0x73, 0xcf, 0xc6, 0xb2];
    pub const PRICE_THRESHOLD_1E18: Selector = [0x86, 0xab, 0x10, 0x71];
    pub const UNLOCK_TIME: Selector = [0x25, 0x1c, 0x1a, 0xa3];
    pub const START_TIME: Selector = [0x78, 0xe9, 0x79, 0x25];
    pub const WITHDRAWN: Selector = [0xc8, 0x0e, 0xc5, 0x22];
    pub const CURRENT_PRICE_1E18: Selector = [0xec, 0xa1, 0xdb, 0x22];
    pub const PRICE_CONDITION_MET: Selector = [0x4b, 0xb8, 0xb8, 0xaa];
    pub const TIME_CONDITION_MET: Selector = [0xcd, 0x2a, 0xbc, 0xfc];
    pub const CAN_WITHDRAW: Selector = [0xb5, 0x14, 0x59, 0xfe];
    pub const PRICE_DETAIL: Selector = [0xee, 0x4a, 0x68, 0x2d];

    // Vault writes
    pub const WITHDRAW: Selector = [0x3c, 0xcf, 0xd6, 0x0b];
    pub const RESCUE_TOKEN: Selector = [0x44, 0x60, 0xd3, 0xcf];
    pub const RESCUE_NATIVE: Selector = [0xfc, 0x82, 0xf0, 0x84];

    // Factory
    pub const CREATE_VAULT_AND_DEPOSIT: Selector = [0xf5, 0x8e, 0xef, 0xc9];
    pub const VAULTS_OF: Selector = [0x6c, 0xc8, 0x11, 0xf8];
}

/// keccak256("VaultCreated(address,address,address,uint256,uint256,uint256)")
pub const VAULT_CREATED_TOPIC: [u8; 32] = [
    0x9e, 0x92, 0xbd, 0x75, 0x8e, 0x49, 0x51, 0x81, 0x33, 0xa2, 0xd6, 0x92, 0x0e, 0xfe, 0x93, 0xa5,
    0x57, 0x5d, 0x29, 0x63, 0x54, 0xa8, 0x44, 0xf4, 0x3b, 0xdb, 0x83, 0x12, 0x8c, 0x78, 0xa2, 0xce,
];

/// Static call argument
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Address(Address),
    Uint(BigUint),
}

pub fn encode_call(selector: Selector, args: &[Token]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + args.len() * WORD);
    data.extend_from_slice(&selector);
    for arg in args {
        data.extend_from_slice(&encode_word(arg));
    }
    data
}

fn encode_word(token: &Token) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    match token {
        Token::Address(addr) => word[12..].copy_from_slice(addr.as_bytes()),
        Token::Uint(value) => {
            let bytes = value.to_bytes_be();
            // Values above 2^256 do not occur in calldata we build; keep the low word
            let bytes = if bytes.len() > WORD { &bytes[bytes.len() - WORD..] } else { &bytes[..] };
            word[WORD - bytes.len()..].copy_from_slice(bytes);
        }
    }
    word
}

/// `0x`-prefixed lower-case hex
pub fn to_hex_data(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

pub fn from_hex_data(text: &str) -> Result<Vec<u8>> {
    let body = text.strip_prefix("0x").unwrap_or(text);
    // Nodes return "0x" for empty data
    if body.is_empty() {
        return Ok(Vec::new());
    }
    hex::decode(body).map_err(|e| DecodeError::InvalidHex { reason: e.to_string() }.into())
}

fn word(data: &[u8], index: usize) -> Result<&[u8]> {
    let start = index * WORD;
    let end = start + WORD;
    if data.len() < end {
        return Err(DecodeError::ShortData { expected: end, actual: data.len() }.into());
    }
    Ok(&data[start..end])
}

pub fn decode_uint(data: &[u8], index: usize) -> Result<BigUint> {
    Ok(BigUint::from_bytes_be(word(data, index)?))
}

pub fn decode_bool(data: &[u8], index: usize) -> Result<bool> {
    let value = decode_uint(data, index)?;
    if value.is_zero() {
        Ok(false)
    } else if value.is_one() {
        Ok(true)
    } else {
        Err(DecodeError::InvalidBool { word: to_hex_data(word(data, index)?) }.into())
    }
}

pub fn decode_address(data: &[u8], index: usize) -> Result<Address> {
    let w = word(data, index)?;
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&w[12..]);
    Ok(Address(bytes))
}

/// Single dynamic `address[]` return value
pub fn decode_address_array(data: &[u8]) -> Result<Vec<Address>> {
    let offset = usize_at(data, 0, "array offset")?;
    if offset % WORD != 0 {
        return Err(DecodeError::Inconsistent { reason: format!("unaligned array offset {}", offset) }.into());
    }
    let head = offset / WORD;
    let len = usize_at(data, head, "array length")?;

    let needed = (head + 1 + len) * WORD;
    if data.len() < needed {
        return Err(DecodeError::ShortData { expected: needed, actual: data.len() }.into());
    }

    (0..len).map(|i| decode_address(data, head + 1 + i)).collect()
}

fn usize_at(data: &[u8], index: usize, field: &str) -> Result<usize> {
    let value = decode_uint(data, index)?;
    // Anything past the payload size is bogus regardless of platform width
    if value > BigUint::from(data.len()) {
        return Err(DecodeError::Inconsistent {
            reason: format!("{} {} exceeds payload of {} bytes", field, value, data.len()),
        }
        .into());
    }
    value.to_usize().ok_or_else(|| DecodeError::Overflow { field: field.to_string() }.into())
}

/// Pair reserves (reserve0, reserve1); the timestamp word is ignored
pub fn decode_reserves(data: &[u8]) -> Result<(BigUint, BigUint)> {
    Ok((decode_uint(data, 0)?, decode_uint(data, 1)?))
}

/// Vault composite price tuple (11 words)
#[derive(Debug, Clone, PartialEq)]
pub struct PriceDetail {
    pub chosen_price: BigUint,
    pub ok: bool,
    pub primary_price: BigUint,
    pub primary_reserve: BigUint,
    pub primary_ok: bool,
    pub backup_price: BigUint,
    pub backup_reserve: BigUint,
    pub backup_ok: bool,
    pub chosen_primary: bool,
    pub chosen_backup: bool,
    pub used_tie_breaker: bool,
}

pub fn decode_price_detail(data: &[u8]) -> Result<PriceDetail> {
    Ok(PriceDetail {
        chosen_price: decode_uint(data, 0)?,
        ok: decode_bool(data, 1)?,
        primary_price: decode_uint(data, 2)?,
        primary_reserve: decode_uint(data, 3)?,
        primary_ok: decode_bool(data, 4)?,
        backup_price: decode_uint(data, 5)?,
        backup_reserve: decode_uint(data, 6)?,
        backup_ok: decode_bool(data, 7)?,
        chosen_primary: decode_bool(data, 8)?,
        chosen_backup: decode_bool(data, 9)?,
        used_tie_breaker: decode_bool(data, 10)?,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct VaultCreated {
    pub owner: Address,
    pub vault: Address,
    pub lock_token: Address,
    pub amount: BigUint,
    pub price_threshold_1e18: BigUint,
    pub unlock_time: BigUint,
}

/// Decode a log as `VaultCreated`; `None` when the topic does not match
pub fn decode_vault_created(topics: &[Vec<u8>], data: &[u8]) -> Option<VaultCreated> {
    if topics.len() != 4 || topics[0].as_slice() != VAULT_CREATED_TOPIC {
        return None;
    }
    let indexed: Vec<Address> = topics[1..]
        .iter()
        .map(|t| decode_address(t, 0))
        .collect::<Result<_>>()
        .ok()?;

    Some(VaultCreated {
        owner: indexed[0],
        vault: indexed[1],
        lock_token: indexed[2],
        amount: decode_uint(data, 0).ok()?,
        price_threshold_1e18: decode_uint(data, 1).ok()?,
        unlock_time: decode_uint(data, 2).ok()?,
    })
}

/// Left-pad helpers for building return data in tests and mocks
pub fn uint_word(value: u128) -> Vec<u8> {
    encode_word(&Token::Uint(BigUint::from(value))).to_vec()
}

pub fn address_word(addr: &Address) -> Vec<u8> {
    encode_word(&Token::Address(*addr)).to_vec()
}

pub fn bool_word(value: bool) -> Vec<u8> {
    uint_word(value as u128)
}
