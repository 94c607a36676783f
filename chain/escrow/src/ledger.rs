//! Escrow Ledger: commitment lifecycle over shared custody
//!
//! Composes the Commitment Store, Custody Pool, and Role Gate, and drives the
//! fund-transfer collaborator. Every operation follows the same shape:
//!
//! 1. Authorize the caller (privileged operations only)
//! 2. Validate state and compute the new accounting without applying it
//! 3. Move funds through the collaborator
//! 4. Apply the state change and record the event
//!
//! Any failure in steps 1-3 returns before anything is applied, so a failed
//! operation leaves no trace.

use escrow_types::ids::{Address, ChainId, CommitmentIndex, Currency, Timestamp};
use escrow_types::request::{Request, Signature};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::commitment::{Commitment, CommitmentStore, NewCommitment};
use crate::config::LedgerConfig;
use crate::errors::{ConfigError, EscrowError, TransferError};
use crate::events::{
    Committed, ContractEvent, Escrowed, FundsWithdrawn, OperatorChanged, OwnershipTransferred,
    Voided,
};
use crate::security::{Role, RoleGate};
use crate::transfer::{Pull, TokenTransfer};
use crate::withdrawal::{CustodyPool, PoolAccount};

/// One deposit request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscrowEntry {
    pub currency: Currency,
    pub amount: Decimal,
    pub chain_id: ChainId,
    pub request: Request,
    pub signature: Signature,
}

/// Batched deposit as parallel arrays, one element per commitment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchEscrow {
    pub currencies: Vec<Currency>,
    pub amounts: Vec<Decimal>,
    pub chain_ids: Vec<ChainId>,
    pub requests: Vec<Request>,
    pub signatures: Vec<Signature>,
}

impl BatchEscrow {
    /// Zip the arrays into entries.
    ///
    /// Every array must have as many elements as `currencies`.
    pub fn into_entries(self) -> Result<Vec<EscrowEntry>, EscrowError> {
        let expected = self.currencies.len();
        let lengths = [
            ("amounts", self.amounts.len()),
            ("chain_ids", self.chain_ids.len()),
            ("requests", self.requests.len()),
            ("signatures", self.signatures.len()),
        ];
        for (field, actual) in lengths {
            if actual != expected {
                return Err(EscrowError::MalformedBatch {
                    field,
                    expected,
                    actual,
                });
            }
        }

        Ok(self
            .currencies
            .into_iter()
            .zip(self.amounts)
            .zip(self.chain_ids)
            .zip(self.requests)
            .zip(self.signatures)
            .map(
                |((((currency, amount), chain_id), request), signature)| EscrowEntry {
                    currency,
                    amount,
                    chain_id,
                    request,
                    signature,
                },
            )
            .collect())
    }
}

impl From<Vec<EscrowEntry>> for BatchEscrow {
    fn from(entries: Vec<EscrowEntry>) -> Self {
        let mut batch = BatchEscrow::default();
        for entry in entries {
            batch.currencies.push(entry.currency);
            batch.amounts.push(entry.amount);
            batch.chain_ids.push(entry.chain_id);
            batch.requests.push(entry.request);
            batch.signatures.push(entry.signature);
        }
        batch
    }
}

/// Funds returned to a depositor by `void`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Refund {
    pub index: CommitmentIndex,
    pub to: Address,
    pub currency: Currency,
    pub amount: Decimal,
}

/// The escrow ledger.
///
/// One instance per deployment. The host serializes calls; each call runs to
/// completion before the next begins.
#[derive(Debug)]
pub struct EscrowLedger {
    commitments: CommitmentStore,
    pool: CustodyPool,
    roles: RoleGate,
    /// Seconds a commitment must stay pending before it can be voided
    void_delay: i64,
    /// Emitted events log (append-only)
    events: Vec<ContractEvent>,
}

impl EscrowLedger {
    /// Create a ledger from a validated config.
    pub fn new(config: LedgerConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        info!(
            owner = %config.owner,
            operator = %config.operator,
            void_delay = config.void_delay_seconds,
            "EscrowLedger initialized"
        );

        Ok(Self {
            commitments: CommitmentStore::new(),
            pool: CustodyPool::new(),
            roles: RoleGate::new(config.owner, config.operator),
            void_delay: config.void_delay_seconds,
            events: Vec::new(),
        })
    }

    // ───────────────────────── Escrow ─────────────────────────

    /// Lock `entry.amount` of `entry.currency` from `depositor` under a new
    /// commitment. Returns the assigned index.
    ///
    /// The pull happens first; no commitment is recorded unless it succeeds.
    pub fn escrow<T: TokenTransfer + ?Sized>(
        &mut self,
        tokens: &mut T,
        depositor: &Address,
        entry: EscrowEntry,
        now: Timestamp,
    ) -> Result<CommitmentIndex, EscrowError> {
        Self::check_escrow_amount(entry.amount)?;

        tokens
            .pull(entry.currency, depositor, entry.amount)
            .map_err(|e| Self::transfer_failed("escrow", e))?;

        Ok(self.record_escrow(depositor, entry, now))
    }

    /// Escrow every entry of `batch` at the same `now`, or none of them.
    ///
    /// Mismatched array lengths are rejected before any transfer. Indices are
    /// assigned in array order.
    pub fn escrow_batch<T: TokenTransfer + ?Sized>(
        &mut self,
        tokens: &mut T,
        depositor: &Address,
        batch: BatchEscrow,
        now: Timestamp,
    ) -> Result<Vec<CommitmentIndex>, EscrowError> {
        let entries = batch.into_entries()?;
        for entry in &entries {
            Self::check_escrow_amount(entry.amount)?;
        }

        let pulls: Vec<Pull> = entries
            .iter()
            .map(|entry| Pull {
                currency: entry.currency,
                from: *depositor,
                amount: entry.amount,
            })
            .collect();

        tokens
            .pull_batch(&pulls)
            .map_err(|e| Self::transfer_failed("escrow_batch", e))?;

        Ok(entries
            .into_iter()
            .map(|entry| self.record_escrow(depositor, entry, now))
            .collect())
    }

    // ───────────────────────── Void ─────────────────────────

    /// Refund a pending commitment to its depositor once the void delay has
    /// passed. Anyone may call this; the refund always goes to the depositor.
    ///
    /// Fails with `TooEarly` while `now <= timestamp + void_delay`.
    pub fn void<T: TokenTransfer + ?Sized>(
        &mut self,
        tokens: &mut T,
        index: CommitmentIndex,
        now: Timestamp,
    ) -> Result<Refund, EscrowError> {
        let commitment = self.commitments.check_voidable(index, now, self.void_delay)?;
        let refund = Refund {
            index,
            to: commitment.owner,
            currency: commitment.currency,
            amount: commitment.amount,
        };

        tokens
            .push(refund.currency, &refund.to, refund.amount)
            .map_err(|e| Self::transfer_failed("void", e))?;

        self.commitments.mark_voided(index)?;

        info!(
            index,
            to = %refund.to,
            currency = %refund.currency,
            amount = %refund.amount,
            "Commitment voided"
        );
        self.events.push(ContractEvent::Voided(Voided {
            index,
            refunded_to: refund.to,
            amount: refund.amount,
        }));
        Ok(refund)
    }

    // ───────────────────────── Commit ─────────────────────────

    /// Move a pending commitment's value into the withdrawable pool.
    /// Operator-only. Irreversible.
    pub fn commit(&mut self, caller: &Address, index: CommitmentIndex) -> Result<(), EscrowError> {
        self.roles.require(caller, Role::Operator)?;

        let commitment = self.commitments.check_pending(index)?;
        let currency = commitment.currency;
        let amount = commitment.amount;
        let account = self.pool.preview_credit(currency, amount)?;

        self.commitments.mark_committed(index)?;
        self.pool.apply(currency, account);

        info!(index, %currency, %amount, pool = %account.balance, "Commitment committed");
        self.events.push(ContractEvent::Committed(Committed {
            index,
            currency,
            amount,
        }));
        Ok(())
    }

    // ───────────────────────── Withdraw ─────────────────────────

    /// Send `amount` of pooled `currency` to `to`. Owner-only.
    ///
    /// Fails with `InsufficientPool` if `amount` exceeds the pool balance.
    /// A destination the collaborator refuses (custody itself, for
    /// `TokenVault`) fails with `TransferFailed` and leaves the pool intact.
    pub fn withdraw<T: TokenTransfer + ?Sized>(
        &mut self,
        tokens: &mut T,
        caller: &Address,
        currency: Currency,
        amount: Decimal,
        to: &Address,
    ) -> Result<(), EscrowError> {
        self.roles.require(caller, Role::Owner)?;

        let account = self.pool.preview_withdrawal(currency, amount)?;

        tokens
            .push(currency, to, amount)
            .map_err(|e| Self::transfer_failed("withdraw", e))?;

        self.pool.apply(currency, account);

        info!(%currency, %amount, %to, pool = %account.balance, "Funds withdrawn");
        self.events.push(ContractEvent::FundsWithdrawn(FundsWithdrawn {
            currency,
            amount,
            to: *to,
        }));
        Ok(())
    }

    /// Withdraw the whole pool balance of `currency`. Returns the amount sent.
    pub fn withdraw_all<T: TokenTransfer + ?Sized>(
        &mut self,
        tokens: &mut T,
        caller: &Address,
        currency: Currency,
        to: &Address,
    ) -> Result<Decimal, EscrowError> {
        let amount = self.pool.balance(currency);
        self.withdraw(tokens, caller, currency, amount, to)?;
        Ok(amount)
    }

    // ───────────────────────── Roles ─────────────────────────

    /// Replace the operator, effective immediately. Owner-only.
    pub fn set_operator(
        &mut self,
        caller: &Address,
        new_operator: Address,
    ) -> Result<(), EscrowError> {
        let old = self.roles.set_operator(caller, new_operator)?;

        info!(%old, new = %new_operator, "Operator changed");
        self.events.push(ContractEvent::OperatorChanged(OperatorChanged {
            old,
            new: new_operator,
        }));
        Ok(())
    }

    /// Hand the owner role to `new_owner`. Owner-only.
    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<(), EscrowError> {
        let old = self.roles.transfer_ownership(caller, new_owner)?;

        info!(%old, new = %new_owner, "Ownership transferred");
        self.events
            .push(ContractEvent::OwnershipTransferred(OwnershipTransferred {
                old,
                new: new_owner,
            }));
        Ok(())
    }

    // ───────────────────────── Queries ─────────────────────────

    /// Read any commitment, including voided and committed ones.
    pub fn commitment(&self, index: CommitmentIndex) -> Result<&Commitment, EscrowError> {
        self.commitments.get(index)
    }

    /// All commitments in index order.
    pub fn commitments(&self) -> impl Iterator<Item = &Commitment> {
        self.commitments.iter()
    }

    pub fn next_index(&self) -> CommitmentIndex {
        self.commitments.next_index()
    }

    pub fn void_delay(&self) -> i64 {
        self.void_delay
    }

    /// Last instant at which voiding `index` is still too early.
    pub fn void_deadline(&self, index: CommitmentIndex) -> Result<Timestamp, EscrowError> {
        Ok(self.commitments.get(index)?.void_deadline(self.void_delay))
    }

    /// Whether `void(index, now)` would pass its state and time checks.
    pub fn is_voidable(&self, index: CommitmentIndex, now: Timestamp) -> bool {
        self.commitments
            .check_voidable(index, now, self.void_delay)
            .is_ok()
    }

    pub fn owner(&self) -> &Address {
        self.roles.owner()
    }

    pub fn operator(&self) -> &Address {
        self.roles.operator()
    }

    /// Withdrawable balance for `currency`.
    pub fn pool_balance(&self, currency: Currency) -> Decimal {
        self.pool.balance(currency)
    }

    pub fn total_committed(&self, currency: Currency) -> Decimal {
        self.pool.account(currency).total_committed
    }

    pub fn total_withdrawn(&self, currency: Currency) -> Decimal {
        self.pool.account(currency).total_withdrawn
    }

    /// Pool totals for every currency that has seen a commit.
    pub fn pools(&self) -> impl Iterator<Item = (&Currency, &PoolAccount)> {
        self.pool.iter()
    }

    // ───────────────────────── Events ─────────────────────────

    /// Get all emitted events.
    pub fn events(&self) -> &[ContractEvent] {
        &self.events
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&mut self) -> Vec<ContractEvent> {
        std::mem::take(&mut self.events)
    }

    // ───────────────────────── Internal ─────────────────────────

    fn check_escrow_amount(amount: Decimal) -> Result<(), EscrowError> {
        if amount <= Decimal::ZERO {
            return Err(EscrowError::InvalidAmount);
        }
        Ok(())
    }

    fn transfer_failed(operation: &'static str, err: TransferError) -> EscrowError {
        warn!(operation, error = %err, "Transfer rejected, operation aborted");
        EscrowError::TransferFailed(err)
    }

    /// Record a commitment whose funds are already in custody.
    fn record_escrow(
        &mut self,
        depositor: &Address,
        entry: EscrowEntry,
        now: Timestamp,
    ) -> CommitmentIndex {
        let currency = entry.currency;
        let amount = entry.amount;
        let index = self.commitments.insert(
            NewCommitment {
                owner: *depositor,
                currency,
                amount,
                chain_id: entry.chain_id,
                request: entry.request,
                signature: entry.signature,
            },
            now,
        );

        info!(index, owner = %depositor, %currency, %amount, timestamp = now, "Escrowed");
        self.events.push(ContractEvent::Escrowed(Escrowed {
            index,
            timestamp: now,
            owner: *depositor,
            currency,
            amount,
        }));
        index
    }
}
