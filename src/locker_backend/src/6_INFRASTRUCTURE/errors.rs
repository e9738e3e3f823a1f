//! Error taxonomy for the locker backend
//!
//! Every fallible path returns `Result<T>` with a categorized `LockerError`.
//! Categories map onto how failures are contained:
//! - `Validation`: rejected before any network call, nothing mutated
//! - `Rpc` / `Decode`: read-path failures, contained per vault or per feed
//! - `Transaction`: write-path failures, always surfaced to the caller verbatim
//! - `Session`: caller addressed a session or vault that does not exist

use candid::{CandidType, Deserialize};
use serde::Serialize;
use std::fmt;

pub type Result<T> = std::result::Result<T, LockerError>;

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum LockerError {
    Validation(ValidationError),
    Rpc(RpcError),
    Decode(DecodeError),
    Transaction(TransactionError),
    Session(SessionError),
    Other(String),
}

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ValidationError {
    InvalidAddress { input: String },
    InvalidAmount { amount: String, reason: String },
    InvalidPrice { price: String, reason: String },
    InvalidUnlockTime { unlock_time: u64, now: u64 },
    InvalidTransactionHash { hash: String },
    InvalidConfig { reason: String },
}

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum RpcError {
    Transport { endpoint: String, reason: String },
    HttpStatus { endpoint: String, status: u64 },
    Node { code: i64, message: String },
    MalformedResponse { reason: String },
    NoEndpoints,
}

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum DecodeError {
    ShortData { expected: usize, actual: usize },
    InvalidBool { word: String },
    Overflow { field: String },
    InvalidHex { reason: String },
    Inconsistent { reason: String },
}

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum TransactionError {
    Reverted { tx_hash: String },
    NotFinalized { tx_hash: String, polls: u32 },
    Unauthorized { account: String, vault: String },
    AlreadyWithdrawn { vault: String },
}

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum SessionError {
    AnonymousCaller,
    NotConnected { account: String },
    NotSessionOwner { account: String },
    TooManySessions { limit: u64 },
    UnknownVault { vault: String },
}

impl fmt::Display for LockerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockerError::Validation(e) => write!(f, "Validation error: {}", e),
            LockerError::Rpc(e) => write!(f, "RPC error: {}", e),
            LockerError::Decode(e) => write!(f, "Decode error: {}", e),
            LockerError::Transaction(e) => write!(f, "Transaction error: {}", e),
            LockerError::Session(e) => write!(f, "Session error: {}", e),
            LockerError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidAddress { input } => {
                write!(f, "'{}' is not a valid address (expected 0x followed by 40 hex characters)", input)
            }
            ValidationError::InvalidAmount { amount, reason } => {
                write!(f, "Invalid amount '{}': {}", amount, reason)
            }
            ValidationError::InvalidPrice { price, reason } => {
                write!(f, "Invalid target price '{}': {}", price, reason)
            }
            ValidationError::InvalidUnlockTime { unlock_time, now } => {
                write!(f, "Unlock time {} must be in the future (now {})", unlock_time, now)
            }
            ValidationError::InvalidTransactionHash { hash } => {
                write!(f, "'{}' is not a valid transaction hash", hash)
            }
            ValidationError::InvalidConfig { reason } => write!(f, "Invalid config: {}", reason),
        }
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcError::Transport { endpoint, reason } => {
                write!(f, "request to {} failed: {}", endpoint, reason)
            }
            RpcError::HttpStatus { endpoint, status } => {
                write!(f, "{} answered with HTTP status {}", endpoint, status)
            }
            RpcError::Node { code, message } => write!(f, "node error {}: {}", code, message),
            RpcError::MalformedResponse { reason } => write!(f, "malformed response: {}", reason),
            RpcError::NoEndpoints => write!(f, "no endpoints configured for this source"),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::ShortData { expected, actual } => {
                write!(f, "return data too short: need {} bytes, got {}", expected, actual)
            }
            DecodeError::InvalidBool { word } => write!(f, "word {} is not a bool", word),
            DecodeError::Overflow { field } => write!(f, "{} does not fit the target type", field),
            DecodeError::InvalidHex { reason } => write!(f, "invalid hex: {}", reason),
            DecodeError::Inconsistent { reason } => write!(f, "inconsistent data: {}", reason),
        }
    }
}

impl fmt::Display for TransactionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionError::Reverted { tx_hash } => {
                write!(f, "transaction {} reverted", tx_hash)
            }
            TransactionError::NotFinalized { tx_hash, polls } => {
                write!(f, "transaction {} not finalized after {} receipt polls", tx_hash, polls)
            }
            TransactionError::Unauthorized { account, vault } => {
                write!(f, "{} is not the owner of vault {} (view only)", account, vault)
            }
            TransactionError::AlreadyWithdrawn { vault } => {
                write!(f, "vault {} is already withdrawn", vault)
            }
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::AnonymousCaller => write!(f, "anonymous callers cannot hold sessions"),
            SessionError::NotConnected { account } => write!(f, "no session for {}", account),
            SessionError::NotSessionOwner { account } => {
                write!(f, "session for {} belongs to another caller", account)
            }
            SessionError::TooManySessions { limit } => {
                write!(f, "session limit of {} reached", limit)
            }
            SessionError::UnknownVault { vault } => {
                write!(f, "vault {} is not loaded in this session", vault)
            }
        }
    }
}

impl std::error::Error for LockerError {}

impl From<ValidationError> for LockerError {
    fn from(e: ValidationError) -> Self {
        LockerError::Validation(e)
    }
}

impl From<RpcError> for LockerError {
    fn from(e: RpcError) -> Self {
        LockerError::Rpc(e)
    }
}

impl From<DecodeError> for LockerError {
    fn from(e: DecodeError) -> Self {
        LockerError::Decode(e)
    }
}

impl From<TransactionError> for LockerError {
    fn from(e: TransactionError) -> Self {
        LockerError::Transaction(e)
    }
}

impl From<SessionError> for LockerError {
    fn from(e: SessionError) -> Self {
        LockerError::Session(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_errors_keep_hash_verbatim() {
        let err = LockerError::from(TransactionError::Reverted {
            tx_hash: "0xabc".to_string(),
        });
        assert_eq!(err.to_string(), "Transaction error: transaction 0xabc reverted");
    }

    #[test]
    fn test_validation_error_names_input() {
        let err = LockerError::from(ValidationError::InvalidAddress {
            input: "0x123".to_string(),
        });
        assert!(err.to_string().contains("'0x123'"));
    }
}
