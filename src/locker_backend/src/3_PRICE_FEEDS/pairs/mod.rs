//! Pair reserve readings
//!
//! A pair yields a reading only when both reserves are non-zero. Price is the
//! counter reserve per lock reserve in 1e18 fixed point; liquidity weight is the
//! counter reserve in whole quote units.

use num_bigint::BigUint;
use num_traits::Zero;
use crate::_4_RPC_ACCESS::abi::{self, selectors};
use crate::_4_RPC_ACCESS::json_rpc::ChainReader;
use crate::_4_RPC_ACCESS::resilient;
use crate::infrastructure::log;
use crate::infrastructure::math::{display_decimals, price_1e18, units_to_f64};
use crate::types::PairConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct FeedQuote {
    pub price_raw: BigUint,
    pub price_float: f64,
    pub quote_reserve_raw: BigUint,
    pub quote_reserve_float: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedReading {
    Available(FeedQuote),
    Unavailable,
}

impl FeedReading {
    pub fn is_ok(&self) -> bool {
        matches!(self, FeedReading::Available(_))
    }

    pub fn quote(&self) -> Option<&FeedQuote> {
        match self {
            FeedReading::Available(q) => Some(q),
            FeedReading::Unavailable => None,
        }
    }
}

/// Reading from raw reserves
pub fn compute_reading(
    reserve0: &BigUint,
    reserve1: &BigUint,
    lock_decimals: u32,
    quote_decimals: u32,
    lock_is_token0: bool,
) -> FeedReading {
    if reserve0.is_zero() || reserve1.is_zero() {
        return FeedReading::Unavailable;
    }

    let (lock_reserve, quote_reserve) = if lock_is_token0 {
        (reserve0, reserve1)
    } else {
        (reserve1, reserve0)
    };

    let Some(price_raw) = price_1e18(quote_reserve, lock_reserve) else {
        return FeedReading::Unavailable;
    };

    FeedReading::Available(FeedQuote {
        price_float: units_to_f64(&price_raw, display_decimals(lock_decimals, quote_decimals)),
        price_raw,
        quote_reserve_float: units_to_f64(quote_reserve, quote_decimals),
        quote_reserve_raw: quote_reserve.clone(),
    })
}

/// Read one pair through the resilient call layer; any failure is `Unavailable`
pub async fn read_pair<R: ChainReader>(reader: &R, pair: &PairConfig, lock_decimals: u32) -> FeedReading {
    let address = pair.address();
    let data = abi::encode_call(selectors::GET_RESERVES, &[]);

    let reserves = match resilient::read(reader, &address, &data).await {
        Ok(raw) => abi::decode_reserves(&raw),
        Err(e) => Err(e),
    };

    match reserves {
        Ok((r0, r1)) => compute_reading(&r0, &r1, lock_decimals, pair.quote_decimals, pair.lock_is_token0),
        Err(e) => {
            log!("⚠️ Pair {} unavailable: {}", pair.pair, e);
            FeedReading::Unavailable
        }
    }
}
