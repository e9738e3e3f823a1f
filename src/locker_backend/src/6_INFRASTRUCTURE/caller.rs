//! Caller checks
//!
//! Sessions and preferences belong to the principal that created them. The
//! anonymous principal is shared by everyone and never owns anything.

use candid::Principal;
use super::errors::{Result, SessionError};

pub fn check_caller(caller: Principal) -> Result<Principal> {
    if caller == Principal::anonymous() {
        return Err(SessionError::AnonymousCaller.into());
    }
    Ok(caller)
}

/// Authenticated caller of the current message
pub fn require_caller() -> Result<Principal> {
    check_caller(ic_cdk::caller())
}
