//! Ledger error types
//!
//! Every failure aborts the enclosing operation with no state change.

use escrow_types::ids::{Address, CommitmentIndex, Currency, Timestamp};
use thiserror::Error;

use crate::commitment::CommitmentState;
use crate::security::Role;
use crate::transfer::Pull;

/// Errors raised by the escrow ledger operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EscrowError {
    #[error("Unauthorized: caller is not the {role:?}")]
    Unauthorized { role: Role },

    #[error("Commitment {index} already finalized: {state:?}")]
    AlreadyFinalized {
        index: CommitmentIndex,
        state: CommitmentState,
    },

    #[error("Commitment {index} cannot be voided until after {voidable_after}")]
    TooEarly {
        index: CommitmentIndex,
        voidable_after: Timestamp,
    },

    #[error("Insufficient pool for {currency}: requested {requested}, available {available}")]
    InsufficientPool {
        currency: Currency,
        requested: String,
        available: String,
    },

    #[error("Transfer failed: {0}")]
    TransferFailed(#[from] TransferError),

    #[error("Malformed batch: {field} has {actual} entries, expected {expected}")]
    MalformedBatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Commitment not found: {index}")]
    CommitmentNotFound { index: CommitmentIndex },

    #[error("Escrow amount must be positive and withdrawal amount non-negative")]
    InvalidAmount,

    #[error("Arithmetic overflow or precision loss in custody accounting")]
    Overflow,
}

/// Errors reported by the fund-transfer collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransferError {
    #[error("Insufficient {currency} held by {holder}: required {required}, available {available}")]
    InsufficientFunds {
        holder: Address,
        currency: Currency,
        required: String,
        available: String,
    },

    #[error("Transfer of {currency} rejected: {reason}")]
    Rejected { currency: Currency, reason: String },

    #[error("Arithmetic overflow or precision loss in token balance")]
    Overflow,

    /// A batch pull failed and returning the earlier pulls also failed.
    /// `stranded` lists the pulls whose funds are still in custody.
    #[error("Batch pull failed ({original}); {} pulls left in custody", stranded.len())]
    CompensationFailed {
        original: Box<TransferError>,
        stranded: Vec<Pull>,
    },
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Void delay must be non-negative, got {0}")]
    NegativeVoidDelay(i64),

    #[error("Invalid ledger config: {0}")]
    Parse(String),
}
