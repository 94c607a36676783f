//! Custodial Escrow Ledger
//!
//! Depositors lock tokens under numbered commitments. The operator commits
//! them into a per-currency withdrawable pool, or after the void delay anyone
//! may refund them to the depositor. The owner controls the operator identity
//! and withdraws pooled funds.
//!
//! # Modules
//! - `errors`: Ledger, transfer, and config error types
//! - `events`: One event per state transition
//! - `security`: Role gate (owner, operator) and per-call authorization
//! - `transfer`: Fund-transfer collaborator trait
//! - `vault`: In-memory token vault implementing the collaborator
//! - `commitment`: Commitment table and lifecycle states
//! - `withdrawal`: Per-currency withdrawable pool accounting
//! - `config`: Construction parameters
//! - `ledger`: The composed escrow ledger
//!
//! # Version
//! v0.1.0

pub mod errors;
pub mod events;
pub mod security;
pub mod transfer;
pub mod vault;
pub mod commitment;
pub mod withdrawal;
pub mod config;
pub mod ledger;

pub use commitment::{Commitment, CommitmentState};
pub use config::LedgerConfig;
pub use errors::{ConfigError, EscrowError, TransferError};
pub use events::ContractEvent;
pub use ledger::{BatchEscrow, EscrowEntry, EscrowLedger, Refund};
pub use transfer::TokenTransfer;
pub use vault::TokenVault;

/// Ledger ABI version, frozen after release
pub const LEDGER_ABI_VERSION: &str = "1.0.0";
