//! Lottery Events
//!
//! Events are recorded during pool execution and can be indexed off-chain
//! for building UIs, analytics, and notifications.

use crate::Vec;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use crate::types::{Address, Amount};

/// Event types for indexing and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum EventType {
    PoolCreated = 0x01,
    ParticipantJoined = 0x10,
    WinnerDrawn = 0x20,
}

/// Main event enum containing all lottery events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum LotteryEvent {
    /// Emitted when a pool is constructed
    PoolCreated {
        pool_account: Address,
        operator: Address,
        min_entry_fee: Amount,
        block_height: u64,
    },

    /// Emitted when a caller enters the current round
    ParticipantJoined {
        participant: Address,
        amount: Amount,
        pool_balance: Amount,
        participant_count: u32,
        round: u64,
        block_height: u64,
    },

    /// Emitted when a draw pays out and resets the round
    WinnerDrawn {
        winner: Address,
        prize: Amount,
        participant_count: u32,
        round: u64,
        block_height: u64,
    },
}

impl LotteryEvent {
    /// Get the event type for filtering
    pub fn event_type(&self) -> EventType {
        match self {
            Self::PoolCreated { .. } => EventType::PoolCreated,
            Self::ParticipantJoined { .. } => EventType::ParticipantJoined,
            Self::WinnerDrawn { .. } => EventType::WinnerDrawn,
        }
    }

    /// Get the block height when event occurred
    pub fn block_height(&self) -> u64 {
        match self {
            Self::PoolCreated { block_height, .. } => *block_height,
            Self::ParticipantJoined { block_height, .. } => *block_height,
            Self::WinnerDrawn { block_height, .. } => *block_height,
        }
    }

    /// Serialize event to bytes for storage/transmission
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Deserialize event from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        borsh::from_slice(bytes).ok()
    }
}

/// Event log for collecting events during execution
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<LotteryEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Emit an event (add to log)
    pub fn emit(&mut self, event: LotteryEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[LotteryEvent] {
        &self.events
    }

    /// Take ownership of all events
    pub fn into_events(self) -> Vec<LotteryEvent> {
        self.events
    }

    /// Filter events by type
    pub fn filter_by_type(&self, event_type: EventType) -> Vec<&LotteryEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
