//! Fund-transfer collaborator interface
//!
//! The ledger never moves tokens itself. It asks a `TokenTransfer`
//! implementation to pull funds into custody or push them out, and only
//! records a state change after an explicit `Ok(())`.

use escrow_types::ids::{Address, Currency};
use escrow_types::Amount;
use tracing::{error, warn};

use crate::errors::TransferError;

/// One "pull into custody" instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pull {
    pub currency: Currency,
    pub from: Address,
    pub amount: Amount,
}

/// Token movement into and out of custody.
pub trait TokenTransfer {
    /// Move `amount` of `currency` from `from` into custody.
    fn pull(
        &mut self,
        currency: Currency,
        from: &Address,
        amount: Amount,
    ) -> Result<(), TransferError>;

    /// Move `amount` of `currency` from custody to `to`.
    fn push(
        &mut self,
        currency: Currency,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TransferError>;

    /// Perform every pull or none of them.
    ///
    /// Default: pull sequentially; on failure, push the completed pulls back
    /// in reverse order. Returns the original error if every push succeeded,
    /// otherwise `CompensationFailed` listing the pulls that could not be
    /// returned.
    fn pull_batch(&mut self, pulls: &[Pull]) -> Result<(), TransferError> {
        for (done, pull) in pulls.iter().enumerate() {
            if let Err(err) = self.pull(pull.currency, &pull.from, pull.amount) {
                warn!(failed_at = done, error = %err, "Batch pull failed, compensating");
                let mut stranded = Vec::new();
                for prior in pulls[..done].iter().rev() {
                    if let Err(undo) = self.push(prior.currency, &prior.from, prior.amount) {
                        error!(
                            currency = %prior.currency,
                            holder = %prior.from,
                            amount = %prior.amount,
                            error = %undo,
                            "Compensating push failed"
                        );
                        stranded.push(*prior);
                    }
                }
                if stranded.is_empty() {
                    return Err(err);
                }
                return Err(TransferError::CompensationFailed {
                    original: Box::new(err),
                    stranded,
                });
            }
        }
        Ok(())
    }
}
