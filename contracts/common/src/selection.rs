//! Winner Selection
//!
//! Maps an entropy seed onto a participant index.

use crate::errors::{LotteryError, LotteryResult};
use crate::types::Amount;

/// Reduce a 32-byte big-endian seed modulo `count`.
///
/// The whole seed participates in the reduction (Horner's rule, one byte at
/// a time), so the result matches `uint256(seed) % count`.
pub fn select_winner_index(seed: &[u8; 32], count: usize) -> LotteryResult<usize> {
    if count == 0 {
        return Err(LotteryError::EmptyPool);
    }

    let modulus = count as u128;
    let mut remainder: u128 = 0;
    for byte in seed.iter() {
        // remainder < modulus <= usize::MAX, so the shift cannot overflow u128
        remainder = ((remainder << 8) | *byte as u128) % modulus;
    }

    Ok(remainder as usize)
}

/// Add an entry payment to the pooled balance
pub fn add_to_pool(balance: Amount, amount: Amount) -> LotteryResult<Amount> {
    balance.checked_add(amount).ok_or(LotteryError::Overflow)
}
