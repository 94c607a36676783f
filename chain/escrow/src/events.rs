//! Ledger events
//!
//! One immutable record per state transition, for off-ledger observers and
//! indexers. An event is recorded only once its operation has fully
//! succeeded.

use escrow_types::ids::{Address, CommitmentIndex, Currency, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A commitment was created and its funds pulled into custody.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Escrowed {
    pub index: CommitmentIndex,
    pub timestamp: Timestamp,
    pub owner: Address,
    pub currency: Currency,
    pub amount: Decimal,
}

/// A pending commitment was refunded to its depositor after the void delay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voided {
    pub index: CommitmentIndex,
    pub refunded_to: Address,
    pub amount: Decimal,
}

/// The operator moved a commitment's value into the withdrawable pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Committed {
    pub index: CommitmentIndex,
    pub currency: Currency,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorChanged {
    pub old: Address,
    pub new: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipTransferred {
    pub old: Address,
    pub new: Address,
}

/// The owner withdrew pooled funds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundsWithdrawn {
    pub currency: Currency,
    pub amount: Decimal,
    pub to: Address,
}

/// Enum wrapper for all ledger events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractEvent {
    Escrowed(Escrowed),
    Voided(Voided),
    Committed(Committed),
    OperatorChanged(OperatorChanged),
    OwnershipTransferred(OwnershipTransferred),
    FundsWithdrawn(FundsWithdrawn),
}

impl ContractEvent {
    /// Commitment the event refers to, if any.
    pub fn commitment_index(&self) -> Option<CommitmentIndex> {
        match self {
            ContractEvent::Escrowed(e) => Some(e.index),
            ContractEvent::Voided(e) => Some(e.index),
            ContractEvent::Committed(e) => Some(e.index),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escrowed_serialization() {
        let event = Escrowed {
            index: 0,
            timestamp: 1_708_123_456,
            owner: Address::repeat_byte(0x0a),
            currency: Currency::new(Address::repeat_byte(0x01)),
            amount: Decimal::new(100_000_000, 8),
        };
        let json = serde_json::to_string(&event).unwrap();
        let deser: Escrowed = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deser);
    }

    #[test]
    fn test_contract_event_tagged_by_variant() {
        let event = ContractEvent::OperatorChanged(OperatorChanged {
            old: Address::repeat_byte(0x01),
            new: Address::repeat_byte(0x02),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("OperatorChanged").is_some());
    }

    #[test]
    fn test_commitment_index() {
        let committed = ContractEvent::Committed(Committed {
            index: 7,
            currency: Currency::new(Address::repeat_byte(0x01)),
            amount: Decimal::from(5),
        });
        assert_eq!(committed.commitment_index(), Some(7));

        let withdrawn = ContractEvent::FundsWithdrawn(FundsWithdrawn {
            currency: Currency::new(Address::repeat_byte(0x01)),
            amount: Decimal::from(5),
            to: Address::repeat_byte(0x09),
        });
        assert_eq!(withdrawn.commitment_index(), None);
    }
}
