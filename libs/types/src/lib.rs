//! Types library for the custodial escrow ledger
//!
//! Shared, frozen type definitions consumed by the ledger core and by any
//! host or relayer that reads its state.
//!
//! # Modules
//! - `ids`: Identities (Address, Currency) and index/time aliases
//! - `numeric`: Exact decimal arithmetic for balances
//! - `request`: Opaque relayer payload attached to each commitment

pub mod ids;
pub mod numeric;
pub mod request;

/// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Token amounts use deterministic decimal arithmetic.
pub type Amount = rust_decimal::Decimal;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::request::*;
    pub use crate::Amount;
}
