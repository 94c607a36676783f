//! Relayer request payload
//!
//! A `Request` is an instruction meant for execution by an external relayer.
//! The ledger stores it verbatim next to its signature and never interprets,
//! validates, or dispatches it.

use serde::{Deserialize, Serialize};

use crate::ids::{Address, ChainId};
use crate::Amount;

/// Opaque off-ledger instruction attached to a commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub from: Address,
    pub to: Address,
    pub value: Amount,
    pub gas: u64,
    pub nonce: u64,
    pub chain_id: ChainId,
    /// Call data, hex-encoded when serialized
    #[serde(with = "hex_bytes")]
    pub data: Vec<u8>,
}

/// Authorization artifact for a `Request`, stored unverified.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(#[serde(with = "hex_bytes")] Vec<u8>);

impl Signature {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Signature {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        let digits = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(digits).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> Request {
        Request {
            from: Address::repeat_byte(0x11),
            to: Address::repeat_byte(0x22),
            value: Amount::new(15, 1),
            gas: 21_000,
            nonce: 7,
            chain_id: 10,
            data: vec![0xde, 0xad, 0xbe, 0xef],
        }
    }

    #[test]
    fn test_request_data_serialized_as_hex() {
        let json = serde_json::to_value(sample_request()).unwrap();
        assert_eq!(json["data"], "0xdeadbeef");
        assert_eq!(json["chain_id"], 10);
    }

    #[test]
    fn test_request_serialization() {
        let request = sample_request();
        let json = serde_json::to_string(&request).unwrap();
        let deser: Request = serde_json::from_str(&json).unwrap();
        assert_eq!(request, deser);
    }

    #[test]
    fn test_empty_signature() {
        let sig = Signature::default();
        assert!(sig.is_empty());
        assert_eq!(serde_json::to_string(&sig).unwrap(), "\"0x\"");
    }

    #[test]
    fn test_signature_bytes_preserved() {
        let sig = Signature::new(vec![1, 2, 3]);
        assert_eq!(sig.as_bytes(), &[1, 2, 3]);
    }
}
