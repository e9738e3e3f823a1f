//! Math utilities
//! Fixed-point conversions shared by feeds, vault state and transaction building

pub mod pure_math;

pub use pure_math::{format_units, multiply_and_divide, parse_units, pow10, to_u64_checked, units_to_f64};

use num_bigint::BigUint;
use num_traits::Zero;
use super::constants::PRICE_DECIMALS;

/// Contract-convention price: counter-asset units per lock-asset unit, scaled by 1e18
///
/// Returns `None` when there is no lock-side liquidity to price against.
pub fn price_1e18(counter_reserve: &BigUint, lock_reserve: &BigUint) -> Option<BigUint> {
    if lock_reserve.is_zero() {
        return None;
    }
    multiply_and_divide(counter_reserve, &pow10(PRICE_DECIMALS), lock_reserve).ok()
}

/// Decimals at which a raw `price_1e18` should be read for display
///
/// The raw ratio still carries the decimal difference between the two tokens
/// (an 8-decimal lock token against a 6-decimal quote reads at 16).
pub fn display_decimals(lock_decimals: u32, quote_decimals: u32) -> u32 {
    (PRICE_DECIMALS + quote_decimals).saturating_sub(lock_decimals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_1e18_basic() {
        // 1000 lock units against 2500 counter units: 2.5 per unit
        let price = price_1e18(&BigUint::from(2500u32), &BigUint::from(1000u32)).unwrap();
        assert_eq!(price, BigUint::from(2_500_000_000_000_000_000u64));
    }

    #[test]
    fn test_price_1e18_zero_lock_reserve() {
        assert!(price_1e18(&BigUint::from(5u8), &BigUint::zero()).is_none());
    }

    #[test]
    fn test_display_decimals() {
        assert_eq!(display_decimals(18, 18), 18);
        assert_eq!(display_decimals(8, 6), 16);
        assert_eq!(display_decimals(8, 18), 28);
    }

    #[test]
    fn test_mixed_decimal_price_reads_correctly() {
        // 1 HEX (8 decimals) against 0.02 USDC-like (6 decimals)
        let lock = pow10(8);
        let counter = BigUint::from(20_000u32);
        let raw = price_1e18(&counter, &lock).unwrap();
        assert_eq!(units_to_f64(&raw, display_decimals(8, 6)), 0.02);
    }
}
