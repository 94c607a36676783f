//! Token vault: in-memory token balances with a custody account
//!
//! Stands in for the host's token system. Holds balances by
//! (holder, currency), moves funds between holders and the custody address,
//! and can freeze a currency so every transfer of it is rejected.

use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

use escrow_types::ids::{Address, Currency};
use escrow_types::numeric::{exact_add, exact_sub};

use crate::errors::TransferError;
use crate::transfer::{Pull, TokenTransfer};

/// In-memory token balances.
///
/// Balances are stored as `HashMap<Address, HashMap<Currency, Decimal>>`.
/// Custody is an ordinary holder whose address is fixed at construction.
#[derive(Debug)]
pub struct TokenVault {
    /// Balances: holder -> (currency -> amount)
    balances: HashMap<Address, HashMap<Currency, Decimal>>,
    /// Address that holds escrowed and pooled funds
    custody: Address,
    /// Currencies whose transfers are rejected
    frozen: HashSet<Currency>,
}

impl TokenVault {
    /// Create an empty vault with the given custody address.
    pub fn new(custody: Address) -> Self {
        Self {
            balances: HashMap::new(),
            custody,
            frozen: HashSet::new(),
        }
    }

    pub fn custody(&self) -> &Address {
        &self.custody
    }

    /// Credit `amount` of `currency` to `holder` out of thin air.
    pub fn mint(
        &mut self,
        holder: Address,
        currency: Currency,
        amount: Decimal,
    ) -> Result<(), TransferError> {
        self.safe_credit(holder, currency, amount)
    }

    /// Get balance for a holder and currency.
    pub fn balance_of(&self, holder: &Address, currency: Currency) -> Decimal {
        self.balances
            .get(holder)
            .and_then(|held| held.get(&currency))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Balance of `currency` held in custody.
    pub fn custody_balance(&self, currency: Currency) -> Decimal {
        self.balance_of(&self.custody, currency)
    }

    /// Reject all further transfers of `currency`.
    pub fn freeze(&mut self, currency: Currency) {
        self.frozen.insert(currency);
    }

    pub fn unfreeze(&mut self, currency: Currency) {
        self.frozen.remove(&currency);
    }

    pub fn is_frozen(&self, currency: Currency) -> bool {
        self.frozen.contains(&currency)
    }

    // ───────────────────────── Internal ─────────────────────────

    fn check_not_frozen(&self, currency: Currency) -> Result<(), TransferError> {
        if self.is_frozen(currency) {
            return Err(TransferError::Rejected {
                currency,
                reason: "currency frozen".to_string(),
            });
        }
        Ok(())
    }

    fn check_non_negative(currency: Currency, amount: Decimal) -> Result<(), TransferError> {
        if amount < Decimal::ZERO {
            return Err(TransferError::Rejected {
                currency,
                reason: format!("negative amount {}", amount),
            });
        }
        Ok(())
    }

    /// Internal credit with overflow protection.
    fn safe_credit(
        &mut self,
        holder: Address,
        currency: Currency,
        amount: Decimal,
    ) -> Result<(), TransferError> {
        let current = self
            .balances
            .entry(holder)
            .or_default()
            .entry(currency)
            .or_insert(Decimal::ZERO);

        *current = exact_add(*current, amount).ok_or(TransferError::Overflow)?;
        Ok(())
    }

    /// Internal debit with underflow protection.
    fn safe_debit(
        &mut self,
        holder: &Address,
        currency: Currency,
        amount: Decimal,
    ) -> Result<(), TransferError> {
        let available = self.balance_of(holder, currency);
        if available < amount {
            return Err(TransferError::InsufficientFunds {
                holder: *holder,
                currency,
                required: amount.to_string(),
                available: available.to_string(),
            });
        }
        exact_sub(available, amount).ok_or(TransferError::Overflow)?;

        if let Some(current) = self
            .balances
            .get_mut(holder)
            .and_then(|held| held.get_mut(&currency))
        {
            *current = exact_sub(*current, amount).ok_or(TransferError::Overflow)?;
        }
        Ok(())
    }

    /// Move funds between two distinct holders. Both legs are checked before
    /// either balance changes.
    fn move_funds(
        &mut self,
        currency: Currency,
        from: &Address,
        to: &Address,
        amount: Decimal,
    ) -> Result<(), TransferError> {
        self.check_not_frozen(currency)?;
        Self::check_non_negative(currency, amount)?;

        if from == to {
            return Err(TransferError::Rejected {
                currency,
                reason: format!("source and destination are both {}", from),
            });
        }

        exact_add(self.balance_of(to, currency), amount).ok_or(TransferError::Overflow)?;

        self.safe_debit(from, currency, amount)?;
        self.safe_credit(*to, currency, amount)
    }
}

impl TokenTransfer for TokenVault {
    fn pull(
        &mut self,
        currency: Currency,
        from: &Address,
        amount: Decimal,
    ) -> Result<(), TransferError> {
        let custody = self.custody;
        self.move_funds(currency, from, &custody, amount)
    }

    fn push(
        &mut self,
        currency: Currency,
        to: &Address,
        amount: Decimal,
    ) -> Result<(), TransferError> {
        let custody = self.custody;
        self.move_funds(currency, &custody, to, amount)
    }

    /// Validates the aggregate debit per (holder, currency) before moving
    /// any funds, so a failing batch leaves every balance untouched.
    fn pull_batch(&mut self, pulls: &[Pull]) -> Result<(), TransferError> {
        let mut debits: HashMap<(Address, Currency), Decimal> = HashMap::new();
        let mut credits: HashMap<Currency, Decimal> = HashMap::new();

        for pull in pulls {
            self.check_not_frozen(pull.currency)?;
            Self::check_non_negative(pull.currency, pull.amount)?;

            if pull.from == self.custody {
                return Err(TransferError::Rejected {
                    currency: pull.currency,
                    reason: format!("source and destination are both {}", pull.from),
                });
            }

            let debit = debits.entry((pull.from, pull.currency)).or_default();
            *debit = exact_add(*debit, pull.amount).ok_or(TransferError::Overflow)?;

            let credit = credits.entry(pull.currency).or_default();
            *credit = exact_add(*credit, pull.amount).ok_or(TransferError::Overflow)?;
        }

        for ((holder, currency), required) in &debits {
            let available = self.balance_of(holder, *currency);
            if available < *required {
                return Err(TransferError::InsufficientFunds {
                    holder: *holder,
                    currency: *currency,
                    required: required.to_string(),
                    available: available.to_string(),
                });
            }
            exact_sub(available, *required).ok_or(TransferError::Overflow)?;
        }

        for (currency, total) in &credits {
            exact_add(self.custody_balance(*currency), *total).ok_or(TransferError::Overflow)?;
        }

        for pull in pulls {
            self.pull(pull.currency, &pull.from, pull.amount)?;
        }
        Ok(())
    }
}
