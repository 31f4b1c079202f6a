//! Checked arithmetic for balances, supplies, and credits
//!
//! All quantity math in the ledger goes through these helpers. Overflow and
//! underflow never wrap; they surface as distinct error kinds that the action
//! boundary converts into unsuccessful results.

use crate::error::{Error, Result};

/// Checked addition
pub fn add(current: u64, amount: u64) -> Result<u64> {
    current
        .checked_add(amount)
        .ok_or(Error::Overflow { current, amount })
}

/// Checked subtraction
pub fn sub(current: u64, amount: u64) -> Result<u64> {
    current
        .checked_sub(amount)
        .ok_or(Error::Underflow { current, amount })
}

/// Checked multiplication
pub fn mul(lhs: u64, rhs: u64) -> Result<u64> {
    lhs.checked_mul(rhs).ok_or(Error::MulOverflow { lhs, rhs })
}
