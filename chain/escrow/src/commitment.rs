//! Commitment Store: append-only, index-addressed table of escrowed deposits
//!
//! - Indices are dense, start at 0, and are never reused
//! - A commitment is created `Pending` and takes exactly one terminal
//!   transition, to `Voided` or `Committed`
//! - Terminal commitments stay in the table for audit
//!
//! The store validates and records state only. Moving funds is the ledger's
//! job, and it calls into the store after the transfer has succeeded.

use escrow_types::ids::{Address, ChainId, CommitmentIndex, Currency, Timestamp};
use escrow_types::request::{Request, Signature};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::EscrowError;

/// Lifecycle state of a commitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommitmentState {
    /// Funds held in escrow, awaiting commit or void
    Pending,
    /// Refunded to the depositor
    Voided,
    /// Moved into the withdrawable pool
    Committed,
}

impl CommitmentState {
    pub fn is_pending(&self) -> bool {
        matches!(self, CommitmentState::Pending)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }
}

/// A single escrowed deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    pub index: CommitmentIndex,
    /// Depositor and refund destination
    pub owner: Address,
    pub currency: Currency,
    pub amount: Decimal,
    /// Creation time; the void deadline counts from here
    pub timestamp: Timestamp,
    /// Where the attached request is meant to execute. Not validated.
    pub chain_id: ChainId,
    pub request: Request,
    pub signature: Signature,
    state: CommitmentState,
}

impl Commitment {
    pub fn state(&self) -> CommitmentState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    pub fn is_voided(&self) -> bool {
        self.state == CommitmentState::Voided
    }

    pub fn is_committed(&self) -> bool {
        self.state == CommitmentState::Committed
    }

    /// Last instant at which a void is still too early.
    pub fn void_deadline(&self, void_delay: i64) -> Timestamp {
        self.timestamp.saturating_add(void_delay)
    }

    /// Voidable strictly after `timestamp + void_delay`.
    pub fn is_voidable(&self, now: Timestamp, void_delay: i64) -> bool {
        self.is_pending() && now > self.void_deadline(void_delay)
    }

    fn ensure_pending(&self) -> Result<(), EscrowError> {
        if !self.is_pending() {
            return Err(EscrowError::AlreadyFinalized {
                index: self.index,
                state: self.state,
            });
        }
        Ok(())
    }

    fn finalize(&mut self, outcome: CommitmentState) -> Result<(), EscrowError> {
        debug_assert!(outcome.is_terminal());
        self.ensure_pending()?;
        self.state = outcome;
        Ok(())
    }
}

/// Fields supplied by the depositor for a new commitment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCommitment {
    pub owner: Address,
    pub currency: Currency,
    pub amount: Decimal,
    pub chain_id: ChainId,
    pub request: Request,
    pub signature: Signature,
}

/// The commitment table.
#[derive(Debug, Default)]
pub struct CommitmentStore {
    /// Position in the vector is the commitment index
    commitments: Vec<Commitment>,
}

impl CommitmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the next created commitment will receive.
    pub fn next_index(&self) -> CommitmentIndex {
        self.commitments.len() as CommitmentIndex
    }

    pub fn len(&self) -> usize {
        self.commitments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commitments.is_empty()
    }

    /// Record a new pending commitment. Returns its index.
    ///
    /// Callers must have pulled the funds into custody already.
    pub fn insert(&mut self, entry: NewCommitment, now: Timestamp) -> CommitmentIndex {
        let index = self.next_index();
        self.commitments.push(Commitment {
            index,
            owner: entry.owner,
            currency: entry.currency,
            amount: entry.amount,
            timestamp: now,
            chain_id: entry.chain_id,
            request: entry.request,
            signature: entry.signature,
            state: CommitmentState::Pending,
        });
        index
    }

    /// Look up a commitment by index, terminal ones included.
    pub fn get(&self, index: CommitmentIndex) -> Result<&Commitment, EscrowError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.commitments.get(i))
            .ok_or(EscrowError::CommitmentNotFound { index })
    }

    fn get_mut(&mut self, index: CommitmentIndex) -> Result<&mut Commitment, EscrowError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.commitments.get_mut(i))
            .ok_or(EscrowError::CommitmentNotFound { index })
    }

    /// All commitments in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Commitment> {
        self.commitments.iter()
    }

    /// Check that `index` may be voided at `now`.
    ///
    /// Fails with `AlreadyFinalized` if not pending, and with `TooEarly` while
    /// `now <= timestamp + void_delay`.
    pub fn check_voidable(
        &self,
        index: CommitmentIndex,
        now: Timestamp,
        void_delay: i64,
    ) -> Result<&Commitment, EscrowError> {
        let commitment = self.get(index)?;
        commitment.ensure_pending()?;

        let voidable_after = commitment.void_deadline(void_delay);
        if now <= voidable_after {
            return Err(EscrowError::TooEarly {
                index,
                voidable_after,
            });
        }
        Ok(commitment)
    }

    /// Check that `index` is still pending.
    pub fn check_pending(&self, index: CommitmentIndex) -> Result<&Commitment, EscrowError> {
        let commitment = self.get(index)?;
        commitment.ensure_pending()?;
        Ok(commitment)
    }

    pub fn mark_voided(&mut self, index: CommitmentIndex) -> Result<(), EscrowError> {
        self.get_mut(index)?.finalize(CommitmentState::Voided)
    }

    pub fn mark_committed(&mut self, index: CommitmentIndex) -> Result<(), EscrowError> {
        self.get_mut(index)?.finalize(CommitmentState::Committed)
    }
}
