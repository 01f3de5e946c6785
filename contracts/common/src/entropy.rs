//! Entropy Sources
//!
//! Winner selection consumes a 32-byte seed obtained from an injected
//! [`EntropySource`]. The pool never generates randomness itself, so hosts
//! can plug in block-derived entropy, a hardened beacon, or a deterministic
//! double for tests without touching pool logic.

use sha2::{Digest, Sha256};

use crate::types::{Address, BlockContext};

/// Inputs available to an entropy source when a draw asks for a seed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntropyRequest {
    /// Identity triggering the draw
    pub caller: Address,
    /// Block the draw executes in
    pub block: BlockContext,
    /// Entries in the round being drawn (always non-zero)
    pub participant_count: u32,
}

/// Capability that supplies unpredictable bits for winner selection
pub trait EntropySource {
    /// Produce a 32-byte seed for the given draw
    fn seed(&mut self, request: &EntropyRequest) -> [u8; 32];
}

impl<T: EntropySource + ?Sized> EntropySource for &mut T {
    fn seed(&mut self, request: &EntropyRequest) -> [u8; 32] {
        (**self).seed(request)
    }
}

/// Block-derived entropy: SHA-256 over the environment's block inputs.
///
/// NOT secure against an adversarial operator or block producer. Anyone who
/// can pick the timestamp, difficulty or draw timing can bias the winner.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockEntropy;

impl BlockEntropy {
    pub fn new() -> Self {
        Self
    }
}

impl EntropySource for BlockEntropy {
    fn seed(&mut self, request: &EntropyRequest) -> [u8; 32] {
        hash_block_inputs(request)
    }
}

/// Hash the environment-supplied inputs of a draw into a seed
pub fn hash_block_inputs(request: &EntropyRequest) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(request.block.difficulty.to_be_bytes());
    hasher.update(request.block.timestamp.to_be_bytes());
    hasher.update(request.block.height.to_be_bytes());
    hasher.update(request.caller);
    hasher.update(request.participant_count.to_be_bytes());
    let result = hasher.finalize();
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&result);
    seed
}

/// Deterministic entropy that always returns the same seed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedEntropy {
    seed: [u8; 32],
}

impl FixedEntropy {
    pub fn new(seed: [u8; 32]) -> Self {
        Self { seed }
    }

    /// Entropy that selects entry `index` whenever the round has more
    /// than `index` entries
    pub fn selecting(index: u32) -> Self {
        Self::new(seed_from_index(index))
    }
}

impl EntropySource for FixedEntropy {
    fn seed(&mut self, _request: &EntropyRequest) -> [u8; 32] {
        self.seed
    }
}

/// Build a seed whose big-endian value is `index`
pub fn seed_from_index(index: u32) -> [u8; 32] {
    let mut seed = [0u8; 32];
    seed[28..].copy_from_slice(&index.to_be_bytes());
    seed
}
