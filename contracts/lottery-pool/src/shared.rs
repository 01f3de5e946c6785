//! Shared Pool Handle
//!
//! In-process host for a [`LotteryPool`]: owns the pool together with its
//! entropy source and ledger, and serializes every call through one mutex.
//! Each invocation holds the lock for its whole duration, so no caller can
//! observe a half-applied join or draw.
//!
//! The handle plays the part of the ledger environment:
//!
//! ```text
//! join(caller, amount):
//!   caller/fee check -> ledger.transfer(caller -> pool, amount) -> pool.join
//!   (pool.join fails => receipt reversed, or ConservationViolated if refused)
//!
//! draw(caller):
//!   pool.draw(entropy, ledger)    // payout + reset, or nothing
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, error, info, warn};

use crate::{CallContext, LotteryPool, LotteryPoolConfig, PoolSnapshot};
use lottery_common::{
    entropy::EntropySource,
    errors::{LotteryError, LotteryResult},
    events::{EventLog, LotteryEvent},
    ledger::Ledger,
    types::{Address, Amount, BlockContext, DrawOutcome},
};

struct PoolHost<E, L> {
    pool: LotteryPool,
    entropy: E,
    ledger: L,
    journal: Vec<LotteryEvent>,
}

/// Cloneable, thread-safe handle to a single pool
pub struct SharedPool<E, L> {
    inner: Arc<Mutex<PoolHost<E, L>>>,
}

impl<E, L> Clone for SharedPool<E, L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: EntropySource, L: Ledger> SharedPool<E, L> {
    /// Host an existing pool
    pub fn new(pool: LotteryPool, entropy: E, ledger: L) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PoolHost {
                pool,
                entropy,
                ledger,
                journal: Vec::new(),
            })),
        }
    }

    /// Construct a pool on behalf of `creator`, who becomes its operator
    pub fn create(
        creator: Address,
        config: LotteryPoolConfig,
        block: BlockContext,
        entropy: E,
        ledger: L,
    ) -> LotteryResult<Self> {
        let mut ctx = CallContext::new(creator, block);
        let pool = LotteryPool::create(&mut ctx, config)?;
        info!(
            "pool created: account={} operator={} fee={}",
            short(&pool.pool_account()),
            short(&creator),
            pool.min_entry_fee()
        );

        let shared = Self::new(pool, entropy, ledger);
        shared.lock()?.journal.extend(ctx.events.into_events());
        Ok(shared)
    }

    fn lock(&self) -> LotteryResult<MutexGuard<'_, PoolHost<E, L>>> {
        self.inner.lock().map_err(|_| LotteryError::StatePoisoned)
    }

    // ============ Operations ============

    /// Pay `amount` from `caller` into the pool and enter the round
    pub fn join(&self, caller: Address, amount: Amount, block: BlockContext) -> LotteryResult<()> {
        let mut guard = self.lock()?;
        let host = &mut *guard;

        // Reject before any value moves
        if let Err(err) = host.pool.check_entry(&caller, amount) {
            warn!("join rejected for {}: {}", short(&caller), err.code());
            return Err(err);
        }

        // Receive the attached value
        let account = host.pool.pool_account();
        if let Err(err) = host.ledger.transfer(&caller, &account, amount) {
            warn!("join payment from {} failed: {}", short(&caller), err.code());
            return Err(err);
        }

        let mut ctx = CallContext::new(caller, block);
        if let Err(err) = host.pool.join(&mut ctx, amount) {
            // Undo the receipt
            if let Err(refund) = host.ledger.transfer(&account, &caller, amount) {
                error!(
                    "refund of {} to {} failed: {}",
                    amount,
                    short(&caller),
                    refund.code()
                );
                return Err(LotteryError::ConservationViolated {
                    recorded: host.pool.balance(),
                    held: host.ledger.balance_of(&account),
                });
            }
            warn!("join rejected for {}: {}", short(&caller), err.code());
            return Err(err);
        }

        debug!(
            "joined: participant={} amount={} balance={} entries={}",
            short(&caller),
            amount,
            host.pool.balance(),
            host.pool.participant_count()
        );
        host.journal.extend(ctx.events.into_events());
        Ok(())
    }

    /// Draw a winner and pay out the pool
    pub fn draw(&self, caller: Address, block: BlockContext) -> LotteryResult<DrawOutcome> {
        let mut guard = self.lock()?;
        let PoolHost {
            pool,
            entropy,
            ledger,
            journal,
        } = &mut *guard;

        let mut ctx = CallContext::new(caller, block);
        match pool.draw(&mut ctx, entropy, ledger) {
            Ok(outcome) => {
                info!(
                    "round {} drawn: winner={} prize={} entries={}",
                    outcome.round,
                    short(&outcome.winner),
                    outcome.prize,
                    outcome.participant_count
                );
                journal.extend(ctx.events.into_events());
                Ok(outcome)
            }
            Err(err) => {
                warn!("draw by {} rejected: {}", short(&caller), err.code());
                Err(err)
            }
        }
    }

    // ============ Queries ============

    pub fn operator(&self) -> LotteryResult<Address> {
        Ok(self.lock()?.pool.operator())
    }

    pub fn balance(&self) -> LotteryResult<Amount> {
        Ok(self.lock()?.pool.balance())
    }

    pub fn participants(&self) -> LotteryResult<Vec<Address>> {
        Ok(self.lock()?.pool.participants().to_vec())
    }

    pub fn round(&self) -> LotteryResult<u64> {
        Ok(self.lock()?.pool.round())
    }

    pub fn snapshot(&self) -> LotteryResult<PoolSnapshot> {
        Ok(self.lock()?.pool.snapshot())
    }

    /// Ledger balance of any account
    pub fn ledger_balance(&self, account: &Address) -> LotteryResult<Amount> {
        Ok(self.lock()?.ledger.balance_of(account))
    }

    pub fn verify_custody(&self) -> LotteryResult<()> {
        let host = self.lock()?;
        host.pool.verify_custody(&host.ledger)
    }

    /// All events emitted by successful calls, oldest first
    pub fn events(&self) -> LotteryResult<EventLog> {
        let host = self.lock()?;
        let mut log = EventLog::new();
        for event in host.journal.iter() {
            log.emit(event.clone());
        }
        Ok(log)
    }

    /// Run `f` against the hosted ledger under the pool lock
    pub fn with_ledger<R>(&self, f: impl FnOnce(&mut L) -> R) -> LotteryResult<R> {
        Ok(f(&mut self.lock()?.ledger))
    }
}

/// Short hex prefix of an address for log lines
fn short(address: &Address) -> String {
    hex::encode(&address[..4])
}

#[cfg(test)]
mod tests {
    use super::*;
    use lottery_common::{
        constants::pool::MIN_ENTRY_FEE,
        entropy::{BlockEntropy, FixedEntropy},
        events::EventType,
        ledger::InMemoryLedger,
    };
    use std::thread;

    const FEE: Amount = MIN_ENTRY_FEE;

    fn pool_account() -> Address {
        [0xAAu8; 32]
    }

    fn operator() -> Address {
        [1u8; 32]
    }

    fn player(i: u8) -> Address {
        [0x10 + i; 32]
    }

    fn block() -> BlockContext {
        BlockContext::new(7, 1_700_000_000, 3)
    }

    fn funded_ledger(players: u8, each: Amount) -> InMemoryLedger {
        let mut ledger = InMemoryLedger::new();
        for i in 0..players {
            ledger.credit(player(i), each).unwrap();
        }
        ledger
    }

    #[test]
    fn test_create_records_event() {
        let shared = SharedPool::create(
            operator(),
            LotteryPoolConfig::new(pool_account()),
            block(),
            FixedEntropy::selecting(0),
            InMemoryLedger::new(),
        )
        .unwrap();

        assert_eq!(shared.operator().unwrap(), operator());
        assert_eq!(shared.events().unwrap().filter_by_type(EventType::PoolCreated).len(), 1);
    }

    #[test]
    fn test_join_moves_funds_into_custody() {
        let pool = LotteryPool::new(pool_account(), operator());
        let shared = SharedPool::new(pool, FixedEntropy::selecting(0), funded_ledger(1, FEE * 5));

        shared.join(player(0), FEE, block()).unwrap();

        assert_eq!(shared.balance().unwrap(), FEE);
        assert_eq!(shared.ledger_balance(&pool_account()).unwrap(), FEE);
        assert_eq!(shared.ledger_balance(&player(0)).unwrap(), FEE * 4);
        shared.verify_custody().unwrap();
    }

    #[test]
    fn test_join_below_fee_moves_nothing() {
        let pool = LotteryPool::new(pool_account(), operator());
        let shared = SharedPool::new(pool, FixedEntropy::selecting(0), funded_ledger(1, FEE));

        let result = shared.join(player(0), FEE - 1, block());

        assert!(matches!(result, Err(LotteryError::InsufficientFee { .. })));
        assert_eq!(shared.ledger_balance(&player(0)).unwrap(), FEE);
        assert!(shared.participants().unwrap().is_empty());
        shared.verify_custody().unwrap();
    }

    #[test]
    fn test_join_without_funds() {
        let pool = LotteryPool::new(pool_account(), operator());
        let shared = SharedPool::new(pool, FixedEntropy::selecting(0), InMemoryLedger::new());

        let result = shared.join(player(0), FEE, block());

        assert!(matches!(result, Err(LotteryError::InsufficientBalance { .. })));
        assert!(shared.participants().unwrap().is_empty());
    }

    #[test]
    fn test_join_overflow_refunds_payment() {
        let mut pool = LotteryPool::new(pool_account(), operator());
        pool.join(&mut CallContext::new(player(1), block()), u64::MAX).unwrap();
        let mut ledger = funded_ledger(1, FEE);
        ledger.credit(pool_account(), u64::MAX - FEE).unwrap();
        let shared = SharedPool::new(pool, FixedEntropy::selecting(0), ledger);

        // Receipt succeeds, pool accounting overflows, receipt is reversed
        let result = shared.join(player(0), FEE, block());
        assert!(matches!(result, Err(LotteryError::Overflow)));
        assert_eq!(shared.ledger_balance(&player(0)).unwrap(), FEE);
        assert_eq!(shared.participants().unwrap().len(), 1);
    }

    #[test]
    fn test_pool_account_join_moves_nothing() {
        let pool = LotteryPool::new(pool_account(), operator());
        let shared = SharedPool::new(pool, FixedEntropy::selecting(0), funded_ledger(1, FEE));
        shared.join(player(0), FEE, block()).unwrap();
        let before = shared.snapshot().unwrap();

        let result = shared.join(pool_account(), FEE, block());

        assert!(matches!(result, Err(LotteryError::InvalidAddress { .. })));
        assert_eq!(shared.snapshot().unwrap(), before);
        assert_eq!(shared.ledger_balance(&pool_account()).unwrap(), FEE);
        shared.verify_custody().unwrap();

        // The round still pays out
        let outcome = shared.draw(operator(), block()).unwrap();
        assert_eq!(outcome.winner, player(0));
        assert_eq!(shared.ledger_balance(&player(0)).unwrap(), FEE);
    }

    #[test]
    fn test_failed_refund_reports_conservation() {
        let mut pool = LotteryPool::new(pool_account(), operator());
        pool.join(&mut CallContext::new(player(1), block()), u64::MAX).unwrap();
        let mut ledger = funded_ledger(1, FEE);
        ledger.credit(pool_account(), u64::MAX - FEE).unwrap();
        ledger.reject_incoming(player(0));
        let shared = SharedPool::new(pool, FixedEntropy::selecting(0), ledger);

        let result = shared.join(player(0), FEE, block());

        assert!(matches!(
            result,
            Err(LotteryError::ConservationViolated { recorded: u64::MAX, held: u64::MAX })
        ));
        assert_eq!(shared.participants().unwrap().len(), 1);
    }

    #[test]
    fn test_draw_pays_winner() {
        let pool = LotteryPool::new(pool_account(), operator());
        let shared = SharedPool::new(pool, FixedEntropy::selecting(1), funded_ledger(2, FEE));

        shared.join(player(0), FEE, block()).unwrap();
        shared.join(player(1), FEE, block()).unwrap();
        let outcome = shared.draw(operator(), block()).unwrap();

        assert_eq!(outcome.winner, player(1));
        assert_eq!(shared.ledger_balance(&player(1)).unwrap(), 2 * FEE);
        assert_eq!(shared.ledger_balance(&player(0)).unwrap(), 0);
        assert_eq!(shared.balance().unwrap(), 0);
        assert!(shared.participants().unwrap().is_empty());
        assert_eq!(shared.round().unwrap(), 1);
        shared.verify_custody().unwrap();

        let events = shared.events().unwrap();
        assert_eq!(events.filter_by_type(EventType::ParticipantJoined).len(), 2);
        assert_eq!(events.filter_by_type(EventType::WinnerDrawn).len(), 1);
    }

    #[test]
    fn test_concurrent_joins_are_serialized() {
        const PLAYERS: u8 = 8;
        const ENTRIES: u64 = 25;

        let pool = LotteryPool::new(pool_account(), operator());
        let shared = SharedPool::new(pool, BlockEntropy::new(), funded_ledger(PLAYERS, FEE * ENTRIES));

        let handles: Vec<_> = (0..PLAYERS)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for _ in 0..ENTRIES {
                        shared.join(player(i), FEE, block()).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let total = FEE * ENTRIES * PLAYERS as u64;
        assert_eq!(shared.balance().unwrap(), total);
        assert_eq!(shared.participants().unwrap().len(), (ENTRIES * PLAYERS as u64) as usize);
        shared.verify_custody().unwrap();

        let outcome = shared.draw(operator(), block()).unwrap();
        assert_eq!(outcome.prize, total);
        assert_eq!(shared.ledger_balance(&outcome.winner).unwrap(), total);
        shared.verify_custody().unwrap();
    }

    #[test]
    fn test_with_ledger() {
        let pool = LotteryPool::new(pool_account(), operator());
        let shared = SharedPool::new(pool, FixedEntropy::selecting(0), InMemoryLedger::new());

        shared.with_ledger(|ledger| ledger.credit(player(0), FEE)).unwrap().unwrap();
        assert_eq!(shared.ledger_balance(&player(0)).unwrap(), FEE);
    }
}
