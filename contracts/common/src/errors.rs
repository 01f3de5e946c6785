//! Error Types for the Pooled Lottery
//!
//! Every failure aborts the triggering operation completely and reports a
//! distinct, identifiable kind. Nothing is retried internally.

/// Result type alias for lottery operations
pub type LotteryResult<T> = Result<T, LotteryError>;

/// Main error enum for all lottery errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LotteryError {
    // ============ Entry Errors ============
    /// Attached value is below the entry fee
    InsufficientFee { attached: u64, minimum: u64 },

    /// Zero amount not allowed
    ZeroAmount,

    // ============ Authorization Errors ============
    /// Caller is not the pool operator
    Unauthorized { expected: [u8; 32], actual: [u8; 32] },

    // ============ Draw Errors ============
    /// Draw attempted with no participants
    EmptyPool,

    /// Payout to the winner could not be delivered
    TransferFailed {
        to: [u8; 32],
        amount: u64,
        reason: TransferFailureReason,
    },

    // ============ Ledger Errors ============
    /// Account cannot cover a debit
    InsufficientBalance { available: u64, requested: u64 },

    /// Recorded pool balance differs from the value held by the ledger
    ConservationViolated { recorded: u64, held: u64 },

    // ============ Math Errors ============
    /// Arithmetic overflow occurred
    Overflow,

    /// Arithmetic underflow occurred
    Underflow,

    // ============ Input Validation Errors ============
    /// Invalid address (e.g., zero address)
    InvalidAddress {
        /// Description of why the address is invalid
        reason: &'static str,
    },

    /// Snapshot bytes could not be decoded or describe an invalid pool
    InvalidSnapshot,

    // ============ Host Errors ============
    /// Shared pool state is unusable after a panic in another caller
    StatePoisoned,
}

/// Why a payout transfer failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferFailureReason {
    /// Recipient refused the funds
    RecipientRejected,
    /// Pool account held less than the payout
    InsufficientCustody,
    /// Recipient balance would overflow
    RecipientOverflow,
    /// Any other environment-level fault
    EnvironmentFault,
}

impl LotteryError {
    /// Returns a stable error code for logging/debugging
    pub fn code(&self) -> &'static str {
        match self {
            Self::InsufficientFee { .. } => "E001_INSUFFICIENT_FEE",
            Self::ZeroAmount => "E002_ZERO_AMOUNT",
            Self::Unauthorized { .. } => "E010_UNAUTHORIZED",
            Self::EmptyPool => "E020_EMPTY_POOL",
            Self::TransferFailed { .. } => "E021_TRANSFER_FAILED",
            Self::InsufficientBalance { .. } => "E030_INSUFFICIENT_BALANCE",
            Self::ConservationViolated { .. } => "E031_CONSERVATION",
            Self::Overflow => "E040_OVERFLOW",
            Self::Underflow => "E041_UNDERFLOW",
            Self::InvalidAddress { .. } => "E050_INVALID_ADDRESS",
            Self::InvalidSnapshot => "E051_INVALID_SNAPSHOT",
            Self::StatePoisoned => "E060_STATE_POISONED",
        }
    }

    /// Returns true if this error is recoverable (caller can fix it)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::InsufficientFee { .. } => true,     // Attach more value
            Self::InsufficientBalance { .. } => true, // Get more funds
            Self::EmptyPool => true,                  // Wait for entries
            Self::TransferFailed { .. } => true,      // Retry the draw
            _ => false,
        }
    }

    /// Wrap a ledger failure raised while paying `to`
    pub fn payout_failure(to: [u8; 32], amount: u64, cause: &LotteryError) -> Self {
        let reason = match cause {
            Self::TransferFailed { reason, .. } => *reason,
            Self::InsufficientBalance { .. } => TransferFailureReason::InsufficientCustody,
            Self::Overflow => TransferFailureReason::RecipientOverflow,
            _ => TransferFailureReason::EnvironmentFault,
        };
        Self::TransferFailed { to, amount, reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_error_codes_unique() {
        let errors = [
            LotteryError::InsufficientFee { attached: 1, minimum: 2 },
            LotteryError::ZeroAmount,
            LotteryError::Unauthorized { expected: [1u8; 32], actual: [2u8; 32] },
            LotteryError::EmptyPool,
            LotteryError::TransferFailed {
                to: [3u8; 32],
                amount: 5,
                reason: TransferFailureReason::RecipientRejected,
            },
            LotteryError::InsufficientBalance { available: 0, requested: 1 },
            LotteryError::ConservationViolated { recorded: 1, held: 0 },
            LotteryError::Overflow,
            LotteryError::Underflow,
            LotteryError::InvalidAddress { reason: "zero" },
            LotteryError::InvalidSnapshot,
            LotteryError::StatePoisoned,
        ];

        let codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        let unique: BTreeSet<_> = codes.iter().collect();
        assert_eq!(codes.len(), unique.len(), "Error codes must be unique");
    }

    #[test]
    fn test_payout_failure_keeps_reason() {
        let cause = LotteryError::TransferFailed {
            to: [9u8; 32],
            amount: 10,
            reason: TransferFailureReason::RecipientRejected,
        };
        let err = LotteryError::payout_failure([9u8; 32], 10, &cause);
        assert_eq!(err, cause);

        let err = LotteryError::payout_failure(
            [9u8; 32],
            10,
            &LotteryError::InsufficientBalance { available: 5, requested: 10 },
        );
        assert!(matches!(
            err,
            LotteryError::TransferFailed {
                reason: TransferFailureReason::InsufficientCustody,
                ..
            }
        ));
    }

    #[test]
    fn test_recoverable() {
        assert!(LotteryError::InsufficientFee { attached: 1, minimum: 2 }.is_recoverable());
        assert!(!LotteryError::Unauthorized { expected: [0u8; 32], actual: [1u8; 32] }.is_recoverable());
        assert!(!LotteryError::Overflow.is_recoverable());
    }
}
