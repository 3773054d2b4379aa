//! Transfer attempt states
//!
//! In-process only; a transfer that reaches storage is always committed, so
//! these states are never persisted.

use std::fmt;

use crate::error::LedgerError;

/// States of a single transfer attempt
///
/// Terminal states: COMMITTED, ABORTED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferState {
    /// Request passed validation, no storage work yet
    Validated,

    /// Unit of work open, acquiring row locks
    Locking,

    /// Both rows locked with fresh balances
    Locked,

    /// Balance rules hold against the locked rows
    Checked,

    /// Terminal: balances and ledger entry committed together
    Committed,

    /// Terminal: unit of work rolled back, nothing persisted
    Aborted,
}

impl TransferState {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferState::Committed | TransferState::Aborted)
    }

    /// Allowed forward edges; any non-terminal state may abort
    pub fn can_transition_to(&self, next: TransferState) -> bool {
        use TransferState::*;
        match (self, next) {
            (Validated, Locking) | (Locking, Locked) | (Locked, Checked) | (Checked, Committed) => {
                true
            }
            (from, Aborted) => !from.is_terminal(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferState::Validated => "VALIDATED",
            TransferState::Locking => "LOCKING",
            TransferState::Locked => "LOCKED",
            TransferState::Checked => "CHECKED",
            TransferState::Committed => "COMMITTED",
            TransferState::Aborted => "ABORTED",
        }
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tracks one attempt through [`TransferState`]
#[derive(Debug)]
pub struct TransferAttempt {
    source_account_number: i64,
    destination_account_number: i64,
    state: TransferState,
}

impl TransferAttempt {
    pub fn new(source_account_number: i64, destination_account_number: i64) -> Self {
        Self {
            source_account_number,
            destination_account_number,
            state: TransferState::Validated,
        }
    }

    #[inline]
    pub fn state(&self) -> TransferState {
        self.state
    }

    /// Move to `next`, rejecting edges the lifecycle does not allow
    pub fn advance(&mut self, next: TransferState) -> Result<(), LedgerError> {
        if !self.state.can_transition_to(next) {
            return Err(LedgerError::PersistenceFailure(format!(
                "invalid transfer state transition {} -> {}",
                self.state, next
            )));
        }
        tracing::debug!(
            source = self.source_account_number,
            destination = self.destination_account_number,
            from = %self.state,
            to = %next,
            "Transfer state"
        );
        self.state = next;
        Ok(())
    }

    /// Record the abort; a no-op if the attempt already ended
    pub fn abort(&mut self) {
        if !self.state.is_terminal() {
            self.state = TransferState::Aborted;
        }
    }
}
