//! Identity types for ledger participants and assets
//!
//! Participants (depositors, owner, operator, withdrawal destinations) are
//! 20-byte addresses. Assets are identified by the address of their token,
//! wrapped in `Currency` so an asset can never be passed where a holder is
//! expected.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Sequential commitment index, assigned from 0 and never reused.
pub type CommitmentIndex = u64;

/// Host-supplied time in seconds.
pub type Timestamp = i64;

/// Chain identifier carried as metadata alongside a relayer request.
pub type ChainId = u64;

/// Length of an address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// Errors parsing an address from its text form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressParseError {
    #[error("Address must start with 0x: {0}")]
    MissingPrefix(String),

    #[error("Address must be {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Address is not valid hex: {0}")]
    InvalidHex(String),
}

/// A 20-byte account identity.
///
/// Text form is `0x` followed by 40 lowercase hex digits, which is also the
/// serialized form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    /// Create from raw bytes
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Address with every byte set to `byte`. Handy for fixtures.
    pub const fn repeat_byte(byte: u8) -> Self {
        Self([byte; ADDRESS_LEN])
    }

    /// Get inner bytes
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| AddressParseError::MissingPrefix(s.to_string()))?;

        let bytes =
            hex::decode(digits).map_err(|e| AddressParseError::InvalidHex(e.to_string()))?;

        let array: [u8; ADDRESS_LEN] = bytes.as_slice().try_into().map_err(|_| {
            AddressParseError::InvalidLength {
                expected: ADDRESS_LEN,
                actual: bytes.len(),
            }
        })?;

        Ok(Self(array))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A fungible asset, identified by its token address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(Address);

impl Currency {
    pub const fn new(token: Address) -> Self {
        Self(token)
    }

    /// Token address backing this currency
    pub fn token(&self) -> &Address {
        &self.0
    }
}

impl From<Address> for Currency {
    fn from(token: Address) -> Self {
        Self(token)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Currency {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_display() {
        let addr = Address::repeat_byte(0xab);
        assert_eq!(
            addr.to_string(),
            "0xabababababababababababababababababababab"
        );
    }

    #[test]
    fn test_address_parse() {
        let addr: Address = "0x00000000000000000000000000000000000000ff".parse().unwrap();
        let mut expected = [0u8; ADDRESS_LEN];
        expected[19] = 0xff;
        assert_eq!(addr, Address::new(expected));
    }

    #[test]
    fn test_address_parse_missing_prefix() {
        let result = "abababababababababababababababababababab".parse::<Address>();
        assert!(matches!(result, Err(AddressParseError::MissingPrefix(_))));
    }

    #[test]
    fn test_address_parse_wrong_length() {
        let result = "0xabcd".parse::<Address>();
        assert_eq!(
            result,
            Err(AddressParseError::InvalidLength {
                expected: ADDRESS_LEN,
                actual: 2
            })
        );
    }

    #[test]
    fn test_address_parse_bad_hex() {
        let result = "0xzz".parse::<Address>();
        assert!(matches!(result, Err(AddressParseError::InvalidHex(_))));
    }

    #[test]
    fn test_address_serializes_as_hex_string() {
        let addr = Address::repeat_byte(0x01);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"0x0101010101010101010101010101010101010101\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn test_zero_address() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address::repeat_byte(1).is_zero());
        assert_eq!(Address::default(), Address::ZERO);
    }

    #[test]
    fn test_currency_wraps_token() {
        let token = Address::repeat_byte(0x0a);
        let currency = Currency::from(token);
        assert_eq!(currency.token(), &token);
        assert_eq!(currency.to_string(), token.to_string());
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn text_form_parses_back(bytes in proptest::array::uniform20(any::<u8>())) {
                let addr = Address::new(bytes);
                prop_assert_eq!(addr.to_string().parse::<Address>().unwrap(), addr);
            }
        }
    }
}
