//! Pooled Lottery Common Library
//!
//! Shared types, constants, and capabilities for the pooled lottery.
//!
//! The lottery core never talks to a chain, a clock, or a random number
//! generator directly. Everything it needs from the hosting environment is
//! expressed as a narrow capability defined here:
//!
//! - **Ledger**: balances and the value-transfer primitive used for payouts
//! - **EntropySource**: unpredictable bits consumed by winner selection
//! - **BlockContext**: height, timestamp and work metric of the current block
//!
//! This crate is `no_std` compatible when built without the `std` feature.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

// Re-export collections for submodules based on feature
#[cfg(not(feature = "std"))]
pub use alloc::{collections::BTreeMap, vec::Vec};
#[cfg(feature = "std")]
pub use std::{collections::BTreeMap, vec::Vec};

pub mod constants;
pub mod errors;
pub mod types;
pub mod events;
pub mod entropy;
pub mod selection;
pub mod ledger;

// Re-exports for convenience
pub use errors::*;
pub use types::*;
pub use events::*;
pub use entropy::*;
pub use selection::*;
pub use ledger::*;
