//! Lottery Pool Contract
//!
//! Pooled-wager lottery. Participants pay at least the entry fee to join the
//! current round; the operator draws a winner who receives the whole pool,
//! and the round resets.
//!
//! ## Funds Invariant
//!
//! `pooled_balance` always equals the value the ledger holds for the pool
//! account. Every operation is all-or-nothing:
//!
//! ```text
//! join:  fee check -> balance += attached -> participants.push(caller)
//! draw:  operator check -> non-empty check -> seed -> index
//!        -> ledger.transfer(pool -> winner, balance)
//!        -> (only on success) participants = [], balance = 0, round += 1
//! ```
//!
//! The pool holds no lock of its own. Hosts must serialize mutating calls
//! against one instance, either by construction (a ledger runtime that
//! executes one invocation at a time) or with [`shared::SharedPool`].

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

pub mod shared;


use lottery_common::{
    constants::{addresses::ZERO, pool::MIN_ENTRY_FEE},
    entropy::{EntropyRequest, EntropySource},
    errors::{LotteryError, LotteryResult},
    events::{EventLog, LotteryEvent},
    ledger::Ledger,
    selection::{add_to_pool, select_winner_index},
    types::{Address, Amount, BlockContext, DrawOutcome, LotteryAction},
};

// ============ Pool Config ============

/// Configuration fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct LotteryPoolConfig {
    /// Ledger account holding the pooled funds
    pub pool_account: Address,
    /// Minimum value a join must attach
    pub min_entry_fee: Amount,
}

impl LotteryPoolConfig {
    /// Config using the design entry fee
    pub fn new(pool_account: Address) -> Self {
        Self {
            pool_account,
            min_entry_fee: MIN_ENTRY_FEE,
        }
    }
}

/// Validate a pool configuration
pub fn validate_config(config: &LotteryPoolConfig) -> LotteryResult<()> {
    if config.pool_account == ZERO {
        return Err(LotteryError::InvalidAddress {
            reason: "pool account cannot be the zero address",
        });
    }
    if config.min_entry_fee == 0 {
        return Err(LotteryError::ZeroAmount);
    }
    Ok(())
}

// ============ Call Context ============

/// Per-invocation data supplied by the hosting environment
#[derive(Debug, Clone)]
pub struct CallContext {
    /// Identity of the caller
    pub caller: Address,
    /// Block the call executes in
    pub block: BlockContext,
    /// Events emitted by this call
    pub events: EventLog,
}

impl CallContext {
    pub fn new(caller: Address, block: BlockContext) -> Self {
        Self {
            caller,
            block,
            events: EventLog::new(),
        }
    }
}

// ============ Pool State ============

/// The lottery state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotteryPool {
    operator: Address,
    pool_account: Address,
    min_entry_fee: Amount,
    participants: Vec<Address>,
    pooled_balance: Amount,
    round: u64,
}

impl LotteryPool {
    /// Create a pool with the design entry fee.
    ///
    /// `operator` is the constructing caller's identity.
    pub fn new(pool_account: Address, operator: Address) -> Self {
        Self {
            operator,
            pool_account,
            min_entry_fee: MIN_ENTRY_FEE,
            participants: Vec::new(),
            pooled_balance: 0,
            round: 0,
        }
    }

    /// Create a pool from a validated config
    pub fn with_config(config: LotteryPoolConfig, operator: Address) -> LotteryResult<Self> {
        validate_config(&config)?;
        Ok(Self {
            min_entry_fee: config.min_entry_fee,
            ..Self::new(config.pool_account, operator)
        })
    }

    /// Construct on behalf of `ctx.caller`, who becomes the operator
    pub fn create(ctx: &mut CallContext, config: LotteryPoolConfig) -> LotteryResult<Self> {
        let pool = Self::with_config(config, ctx.caller)?;

        ctx.events.emit(LotteryEvent::PoolCreated {
            pool_account: pool.pool_account,
            operator: pool.operator,
            min_entry_fee: pool.min_entry_fee,
            block_height: ctx.block.height,
        });

        Ok(pool)
    }

    // ============ Operations ============

    /// Reject entries from the pool account and payments below the entry fee
    pub fn check_entry(&self, caller: &Address, attached: Amount) -> LotteryResult<()> {
        if *caller == self.pool_account {
            return Err(LotteryError::InvalidAddress {
                reason: "pool account cannot join its own pool",
            });
        }
        if attached < self.min_entry_fee {
            return Err(LotteryError::InsufficientFee {
                attached,
                minimum: self.min_entry_fee,
            });
        }
        Ok(())
    }

    /// Record `ctx.caller` as a participant who attached `attached`.
    ///
    /// The environment has already moved `attached` into the pool account.
    pub fn join(&mut self, ctx: &mut CallContext, attached: Amount) -> LotteryResult<()> {
        // 1. Caller and fee threshold
        self.check_entry(&ctx.caller, attached)?;

        // 2. Compute the new state before touching anything
        let new_balance = add_to_pool(self.pooled_balance, attached)?;
        let new_count = u32::try_from(self.participants.len() + 1)
            .map_err(|_| LotteryError::Overflow)?;

        // 3. Commit
        self.participants.push(ctx.caller);
        self.pooled_balance = new_balance;

        // 4. Emit event
        ctx.events.emit(LotteryEvent::ParticipantJoined {
            participant: ctx.caller,
            amount: attached,
            pool_balance: new_balance,
            participant_count: new_count,
            round: self.round,
            block_height: ctx.block.height,
        });

        Ok(())
    }

    /// Select a winner, pay out the whole pool and reset the round.
    ///
    /// Nothing is reset unless the payout transfer succeeds.
    pub fn draw<E, L>(
        &mut self,
        ctx: &mut CallContext,
        entropy: &mut E,
        ledger: &mut L,
    ) -> LotteryResult<DrawOutcome>
    where
        E: EntropySource + ?Sized,
        L: Ledger + ?Sized,
    {
        // 1. Only the operator can draw
        if ctx.caller != self.operator {
            return Err(LotteryError::Unauthorized {
                expected: self.operator,
                actual: ctx.caller,
            });
        }

        // 2. Need at least one entry
        if self.participants.is_empty() {
            return Err(LotteryError::EmptyPool);
        }

        // join keeps the count within u32
        let participant_count = self.participant_count();

        // 3. Select the winner
        let seed = entropy.seed(&EntropyRequest {
            caller: ctx.caller,
            block: ctx.block,
            participant_count,
        });
        let index = select_winner_index(&seed, self.participants.len())?;
        let winner = self
            .participants
            .get(index)
            .copied()
            .ok_or(LotteryError::EmptyPool)?;
        let prize = self.pooled_balance;

        // 4. Pay out
        ledger
            .transfer(&self.pool_account, &winner, prize)
            .map_err(|cause| LotteryError::payout_failure(winner, prize, &cause))?;

        // 5. Reset the round
        let round = self.round;
        self.participants.clear();
        self.pooled_balance = 0;
        self.round = self.round.saturating_add(1);

        // 6. Emit event
        ctx.events.emit(LotteryEvent::WinnerDrawn {
            winner,
            prize,
            participant_count,
            round,
            block_height: ctx.block.height,
        });

        Ok(DrawOutcome {
            round,
            winner,
            winner_index: index as u32,
            prize,
            participant_count,
        })
    }

    // ============ Queries ============

    pub fn operator(&self) -> Address {
        self.operator
    }

    /// Value accumulated since the last draw
    pub fn balance(&self) -> Amount {
        self.pooled_balance
    }

    /// Entries of the current round, in join order
    pub fn participants(&self) -> &[Address] {
        &self.participants
    }

    pub fn participant_count(&self) -> u32 {
        self.participants.len() as u32
    }

    pub fn min_entry_fee(&self) -> Amount {
        self.min_entry_fee
    }

    pub fn pool_account(&self) -> Address {
        self.pool_account
    }

    /// Number of completed draws
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Check that the ledger holds exactly the recorded pool balance
    pub fn verify_custody<L: Ledger + ?Sized>(&self, ledger: &L) -> LotteryResult<()> {
        let held = ledger.balance_of(&self.pool_account);
        if held != self.pooled_balance {
            return Err(LotteryError::ConservationViolated {
                recorded: self.pooled_balance,
                held,
            });
        }
        Ok(())
    }

    // ============ Snapshots ============

    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            operator: self.operator,
            pool_account: self.pool_account,
            min_entry_fee: self.min_entry_fee,
            participants: self.participants.clone(),
            pooled_balance: self.pooled_balance,
            round: self.round,
        }
    }

    /// Rebuild a pool from a snapshot
    pub fn restore(snapshot: PoolSnapshot) -> LotteryResult<Self> {
        validate_config(&LotteryPoolConfig {
            pool_account: snapshot.pool_account,
            min_entry_fee: snapshot.min_entry_fee,
        })
        .map_err(|_| LotteryError::InvalidSnapshot)?;

        // Every entry paid at least the fee
        let count = u32::try_from(snapshot.participants.len())
            .map_err(|_| LotteryError::InvalidSnapshot)?;
        let floor = snapshot
            .min_entry_fee
            .checked_mul(count as u64)
            .ok_or(LotteryError::InvalidSnapshot)?;
        if snapshot.pooled_balance < floor {
            return Err(LotteryError::InvalidSnapshot);
        }

        Ok(Self {
            operator: snapshot.operator,
            pool_account: snapshot.pool_account,
            min_entry_fee: snapshot.min_entry_fee,
            participants: snapshot.participants,
            pooled_balance: snapshot.pooled_balance,
            round: snapshot.round,
        })
    }
}

/// Serializable copy of a pool's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PoolSnapshot {
    pub operator: Address,
    pub pool_account: Address,
    pub min_entry_fee: Amount,
    pub participants: Vec<Address>,
    pub pooled_balance: Amount,
    pub round: u64,
}

impl PoolSnapshot {
    /// Serialize snapshot to bytes for storage
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Deserialize snapshot from bytes
    pub fn from_bytes(bytes: &[u8]) -> LotteryResult<Self> {
        borsh::from_slice(bytes).map_err(|_| LotteryError::InvalidSnapshot)
    }
}

// ============ Action Dispatch ============

/// What a successful action did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Joined,
    Drawn(DrawOutcome),
}

/// Main execution entry point
pub fn execute<E, L>(
    pool: &mut LotteryPool,
    ctx: &mut CallContext,
    action: &LotteryAction,
    entropy: &mut E,
    ledger: &mut L,
) -> LotteryResult<ActionOutcome>
where
    E: EntropySource + ?Sized,
    L: Ledger + ?Sized,
{
    match action {
        LotteryAction::Join { amount } => pool.join(ctx, *amount).map(|_| ActionOutcome::Joined),
        LotteryAction::Draw => pool.draw(ctx, entropy, ledger).map(ActionOutcome::Drawn),
    }
}

// ============ Tests ============
