use std::fmt;
use crate::infrastructure::errors::{Result, ValidationError};

/// 20-byte EVM account or contract address
///
/// Always rendered lower-case with a `0x` prefix, the form every persisted key
/// and every collection lookup uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    /// Syntactic check only: `0x` (either case) followed by 40 hex characters
    pub fn parse(input: &str) -> Result<Address> {
        let trimmed = input.trim();
        let invalid = || ValidationError::InvalidAddress { input: input.to_string() };

        let body = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(invalid)?;

        if body.len() != 40 {
            return Err(invalid().into());
        }

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(body, &mut bytes).map_err(|_| invalid())?;
        Ok(Address(bytes))
    }

    pub fn is_zero(&self) -> bool {
        *self == Address::ZERO
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_to_lowercase() {
        let addr = Address::parse("  0X6B175474E89094C44Da98b954EedeAC495271d0F ").unwrap();
        assert_eq!(addr.to_hex(), "0x6b175474e89094c44da98b954eedeac495271d0f");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Address::parse("0x123").is_err());
        assert!(Address::parse("6b175474e89094c44da98b954eedeac495271d0f").is_err());
        assert!(Address::parse("0xzz175474e89094c44da98b954eedeac495271d0f").is_err());
        assert!(Address::parse("").is_err());
    }

    #[test]
    fn test_zero() {
        let zero = Address::parse("0x0000000000000000000000000000000000000000").unwrap();
        assert!(zero.is_zero());
        assert_eq!(zero, Address::ZERO);
    }
}
