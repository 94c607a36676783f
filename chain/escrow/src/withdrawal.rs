//! Custody accounting: per-currency withdrawable pool
//!
//! Committed value leaves its commitment and joins a fungible pool for its
//! currency. The owner withdraws from the pool to any destination. For each
//! currency:
//!
//! `pool_balance == total_committed - total_withdrawn`

use escrow_types::ids::Currency;
use escrow_types::numeric::{exact_add, exact_sub};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::EscrowError;

/// Running totals for one currency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolAccount {
    pub balance: Decimal,
    pub total_committed: Decimal,
    pub total_withdrawn: Decimal,
}

/// Withdrawable pools keyed by currency.
///
/// Uses BTreeMap for deterministic iteration.
#[derive(Debug, Default)]
pub struct CustodyPool {
    accounts: BTreeMap<Currency, PoolAccount>,
}

impl CustodyPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current withdrawable balance for `currency`.
    pub fn balance(&self, currency: Currency) -> Decimal {
        self.account(currency).balance
    }

    /// Totals for `currency`, zero if never touched.
    pub fn account(&self, currency: Currency) -> PoolAccount {
        self.accounts.get(&currency).copied().unwrap_or_default()
    }

    /// Every currency that has seen a commit, in order.
    pub fn iter(&self) -> impl Iterator<Item = (&Currency, &PoolAccount)> {
        self.accounts.iter()
    }

    /// Compute the account after crediting `amount` without applying it.
    pub fn preview_credit(
        &self,
        currency: Currency,
        amount: Decimal,
    ) -> Result<PoolAccount, EscrowError> {
        let mut account = self.account(currency);
        account.balance = exact_add(account.balance, amount).ok_or(EscrowError::Overflow)?;
        account.total_committed =
            exact_add(account.total_committed, amount).ok_or(EscrowError::Overflow)?;
        Ok(account)
    }

    /// Compute the account after withdrawing `amount` without applying it.
    ///
    /// Fails with `InsufficientPool` if `amount` exceeds the balance.
    pub fn preview_withdrawal(
        &self,
        currency: Currency,
        amount: Decimal,
    ) -> Result<PoolAccount, EscrowError> {
        if amount < Decimal::ZERO {
            return Err(EscrowError::InvalidAmount);
        }

        let mut account = self.account(currency);
        if amount > account.balance {
            return Err(EscrowError::InsufficientPool {
                currency,
                requested: amount.to_string(),
                available: account.balance.to_string(),
            });
        }

        account.balance = exact_sub(account.balance, amount).ok_or(EscrowError::Overflow)?;
        account.total_withdrawn =
            exact_add(account.total_withdrawn, amount).ok_or(EscrowError::Overflow)?;
        Ok(account)
    }

    /// Store an account produced by one of the preview methods.
    pub fn apply(&mut self, currency: Currency, account: PoolAccount) {
        self.accounts.insert(currency, account);
    }

    /// Credit committed value to the pool.
    pub fn credit(&mut self, currency: Currency, amount: Decimal) -> Result<(), EscrowError> {
        let account = self.preview_credit(currency, amount)?;
        self.apply(currency, account);
        Ok(())
    }

    /// Debit a withdrawal from the pool.
    pub fn debit(&mut self, currency: Currency, amount: Decimal) -> Result<(), EscrowError> {
        let account = self.preview_withdrawal(currency, amount)?;
        self.apply(currency, account);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use escrow_types::ids::Address;

    fn usd() -> Currency {
        Currency::new(Address::repeat_byte(0x01))
    }

    fn eth() -> Currency {
        Currency::new(Address::repeat_byte(0x02))
    }

    #[test]
    fn test_empty_pool() {
        let pool = CustodyPool::new();
        assert_eq!(pool.balance(usd()), Decimal::ZERO);
        assert_eq!(pool.account(usd()), PoolAccount::default());
    }

    #[test]
    fn test_credit_and_debit() {
        let mut pool = CustodyPool::new();
        pool.credit(usd(), Decimal::from(50)).unwrap();
        pool.debit(usd(), Decimal::from(30)).unwrap();

        let account = pool.account(usd());
        assert_eq!(account.balance, Decimal::from(20));
        assert_eq!(account.total_committed, Decimal::from(50));
        assert_eq!(account.total_withdrawn, Decimal::from(30));
    }

    #[test]
    fn test_debit_more_than_balance() {
        let mut pool = CustodyPool::new();
        pool.credit(usd(), Decimal::from(20)).unwrap();
        let result = pool.debit(usd(), Decimal::from(21));
        assert_eq!(
            result,
            Err(EscrowError::InsufficientPool {
                currency: usd(),
                requested: "21".to_string(),
                available: "20".to_string(),
            })
        );
        assert_eq!(pool.balance(usd()), Decimal::from(20));
    }

    #[test]
    fn test_debit_exact_balance_leaves_zero() {
        let mut pool = CustodyPool::new();
        pool.credit(usd(), Decimal::from(20)).unwrap();
        pool.debit(usd(), Decimal::from(20)).unwrap();
        assert_eq!(pool.balance(usd()), Decimal::ZERO);
    }

    #[test]
    fn test_negative_withdrawal_rejected() {
        let mut pool = CustodyPool::new();
        pool.credit(usd(), Decimal::from(20)).unwrap();
        assert_eq!(
            pool.debit(usd(), Decimal::from(-1)),
            Err(EscrowError::InvalidAmount)
        );
    }

    #[test]
    fn test_currencies_isolated() {
        let mut pool = CustodyPool::new();
        pool.credit(usd(), Decimal::from(10)).unwrap();
        assert_eq!(pool.balance(eth()), Decimal::ZERO);
        assert!(pool.debit(eth(), Decimal::from(1)).is_err());
    }

    #[test]
    fn test_credit_overflow() {
        let mut pool = CustodyPool::new();
        pool.credit(usd(), Decimal::MAX).unwrap();
        assert_eq!(
            pool.credit(usd(), Decimal::from(1)),
            Err(EscrowError::Overflow)
        );
        assert_eq!(pool.balance(usd()), Decimal::MAX);
    }

    #[test]
    fn test_preview_does_not_apply() {
        let pool = CustodyPool::new();
        let preview = pool.preview_credit(usd(), Decimal::from(5)).unwrap();
        assert_eq!(preview.balance, Decimal::from(5));
        assert_eq!(pool.balance(usd()), Decimal::ZERO);
    }

    #[test]
    fn test_credit_that_would_round_rejected() {
        let big = Decimal::from_i128_with_scale(10_i128.pow(28), 0);
        let mut pool = CustodyPool::new();
        pool.credit(usd(), big).unwrap();
        assert_eq!(
            pool.credit(usd(), Decimal::new(1, 10)),
            Err(EscrowError::Overflow)
        );
        assert_eq!(pool.account(usd()).balance, big);
        assert_eq!(pool.account(usd()).total_committed, big);
    }

    #[test]
    fn test_withdrawal_that_would_round_rejected() {
        let big = Decimal::from_i128_with_scale(10_i128.pow(28), 0);
        let mut pool = CustodyPool::new();
        pool.credit(usd(), big).unwrap();
        assert_eq!(
            pool.debit(usd(), Decimal::new(1, 10)),
            Err(EscrowError::Overflow)
        );
        assert_eq!(pool.balance(usd()), big);
    }
}
