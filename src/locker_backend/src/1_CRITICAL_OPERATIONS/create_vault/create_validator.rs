//! Validation for vault creation
//!
//! Runs before any network call; a rejected request touches nothing.

use num_bigint::BigUint;
use num_traits::Zero;
use crate::infrastructure::constants::PRICE_DECIMALS;
use crate::infrastructure::errors::{Result, ValidationError};
use crate::infrastructure::math::parse_units;
use crate::types::LockAsset;
use super::CreateVaultArgs;

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedCreate {
    pub asset: LockAsset,
    pub amount: BigUint,
    pub threshold_1e18: BigUint,
    pub unlock_time: u64,
}

pub fn validate_create_request(args: &CreateVaultArgs, now: u64) -> Result<ValidatedCreate> {
    let amount_text = args.amount.trim();
    if amount_text.is_empty() {
        return Err(ValidationError::InvalidAmount {
            amount: args.amount.clone(),
            reason: "enter an amount".to_string(),
        }
        .into());
    }

    let amount = parse_units(amount_text, args.asset.lock_decimals()).map_err(|reason| {
        ValidationError::InvalidAmount { amount: args.amount.clone(), reason }
    })?;

    if amount.is_zero() {
        return Err(ValidationError::InvalidAmount {
            amount: args.amount.clone(),
            reason: "must be greater than zero".to_string(),
        }
        .into());
    }

    let price_text = args.target_price.trim();
    if price_text.is_empty() {
        return Err(ValidationError::InvalidPrice {
            price: args.target_price.clone(),
            reason: "enter a target price (USD per 1 token)".to_string(),
        }
        .into());
    }

    let threshold_1e18 = parse_units(price_text, PRICE_DECIMALS).map_err(|reason| {
        ValidationError::InvalidPrice { price: args.target_price.clone(), reason }
    })?;

    if args.unlock_time <= now {
        return Err(ValidationError::InvalidUnlockTime { unlock_time: args.unlock_time, now }.into());
    }

    Ok(ValidatedCreate {
        asset: args.asset,
        amount,
        threshold_1e18,
        unlock_time: args.unlock_time,
    })
}
