//! Pure mathematical functions - no I/O, no async
//! All functions here must be deterministic and side-effect free

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use rust_decimal::Decimal;
use std::str::FromStr;
use crate::infrastructure::errors::{Result, LockerError, DecodeError};

/// 10^exp as BigUint
pub fn pow10(exp: u32) -> BigUint {
    BigUint::from(10u32).pow(exp)
}

/// Multiply two BigUints and divide by a third with arbitrary precision
/// Formula: (a × b) ÷ c
pub fn multiply_and_divide(a: &BigUint, b: &BigUint, c: &BigUint) -> Result<BigUint> {
    if c.is_zero() {
        return Err(LockerError::Other(format!("({} × {}) ÷ 0: division by zero", a, b)));
    }
    Ok((a * b) / c)
}

/// Render a fixed-point integer as an exact decimal string
///
/// The fraction keeps at least one digit and drops trailing zeros:
/// `1500000000000000000` at 18 decimals -> `"1.5"`, `10^18` -> `"1.0"`, `0` -> `"0.0"`.
pub fn format_units(value: &BigUint, decimals: u32) -> String {
    let digits = value.to_str_radix(10);
    let decimals = decimals as usize;

    if decimals == 0 {
        return format!("{}.0", digits);
    }

    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals - digits.len() + 1), digits)
    } else {
        digits
    };

    let split = padded.len() - decimals;
    let (whole, fraction) = padded.split_at(split);
    let fraction = fraction.trim_end_matches('0');
    let fraction = if fraction.is_empty() { "0" } else { fraction };

    format!("{}.{}", whole, fraction)
}

/// Fixed-point integer to f64 through the exact decimal string
pub fn units_to_f64(value: &BigUint, decimals: u32) -> f64 {
    format_units(value, decimals).parse::<f64>().unwrap_or(f64::NAN)
}

/// Parse a user-entered decimal amount into base units
///
/// Rejects negative values and more fractional digits than `decimals`.
pub fn parse_units(text: &str, decimals: u32) -> std::result::Result<BigUint, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err("value is empty".to_string());
    }

    let value = Decimal::from_str(trimmed).map_err(|e| format!("not a decimal number ({})", e))?;

    if value.is_sign_negative() && !value.is_zero() {
        return Err("value is negative".to_string());
    }

    let normalized = value.normalize();
    let scale = normalized.scale();
    if scale > decimals {
        return Err(format!("more than {} decimal places", decimals));
    }

    let mantissa = normalized.mantissa().unsigned_abs();
    Ok(BigUint::from(mantissa) * pow10(decimals - scale))
}

/// BigUint to u64, naming the field on overflow
pub fn to_u64_checked(value: &BigUint, field: &str) -> Result<u64> {
    value.to_u64().ok_or_else(|| {
        LockerError::Decode(DecodeError::Overflow { field: field.to_string() })
    })
}

// ===== Tests =====
