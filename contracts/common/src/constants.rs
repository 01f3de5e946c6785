//! Protocol Constants
//!
//! Design constants for the pooled lottery. Amounts are expressed in base
//! units with 8 decimal places.

/// Unit Metadata
pub mod token {
    /// One whole unit expressed in base units
    pub const ONE: u64 = 100_000_000;
}

/// Pool Configuration
pub mod pool {
    use super::token::ONE;

    /// Minimum payment accepted by `join` (0.01 unit)
    pub const MIN_ENTRY_FEE: u64 = ONE / 100;
}

/// Reserved addresses
pub mod addresses {
    /// The all-zero address, never a valid pool account
    pub const ZERO: [u8; 32] = [0u8; 32];
}
