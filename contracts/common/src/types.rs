//! Core Types for the Pooled Lottery
//!
//! Fundamental data structures shared by the lottery contracts and their
//! hosts.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// Type alias for account identities (32-byte hash)
pub type Address = [u8; 32];

/// Value in base units
pub type Amount = u64;

// ============ Environment Types ============

/// Block data supplied by the hosting environment for each invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct BlockContext {
    /// Current block height
    pub height: u64,
    /// Block timestamp (seconds)
    pub timestamp: u64,
    /// Difficulty / work metric of the block
    pub difficulty: u64,
}

impl BlockContext {
    /// Creates a block context
    pub fn new(height: u64, timestamp: u64, difficulty: u64) -> Self {
        Self { height, timestamp, difficulty }
    }
}

// ============ Action Types ============

/// Actions callers can perform against a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum LotteryAction {
    /// Enter the current round with an attached payment
    Join { amount: Amount },
    /// Select a winner and pay out the pool (operator only)
    Draw,
}

/// Result of a successful draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct DrawOutcome {
    /// Round that was closed by this draw
    pub round: u64,
    /// Identity that received the pool
    pub winner: Address,
    /// Position of the winning entry in the participant list
    pub winner_index: u32,
    /// Value transferred to the winner
    pub prize: Amount,
    /// Number of entries in the closed round
    pub participant_count: u32,
}
