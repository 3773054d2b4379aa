//! Ledger Error Types
//!
//! One error enum for validation, engine and storage failures. The gateway
//! maps each variant to an HTTP status via [`LedgerError::http_status`].

use thiserror::Error;

use crate::money::MoneyError;

/// Ledger error kinds
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    // === Validation Errors ===
    #[error("Invalid {field}: {reason}")]
    MalformedAmount { field: &'static str, reason: String },

    #[error("Invalid {field}: {reason}")]
    InvalidAmount {
        field: &'static str,
        reason: &'static str,
    },

    #[error("{field} must be a positive integer, got {value}")]
    InvalidIdentity { field: &'static str, value: i64 },

    #[error("Cannot transfer to the same account ({0})")]
    SelfTransfer(i64),

    // === Account Errors ===
    #[error("Account {0} already exists")]
    AlreadyExists(i64),

    #[error("{role} account {account_number} not found")]
    NotFound {
        role: &'static str,
        account_number: i64,
    },

    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Balance rejected at storage boundary: {0}")]
    InvalidBalance(String),

    // === System Errors ===
    #[error("Request deadline exceeded")]
    DeadlineExceeded,

    #[error("Database error: {0}")]
    PersistenceFailure(String),
}

impl LedgerError {
    /// Shorthand for a missing account in a given role ("source", "destination", "account")
    pub fn not_found(role: &'static str, account_number: i64) -> Self {
        LedgerError::NotFound {
            role,
            account_number,
        }
    }

    /// Attach the offending request field to a money parse error
    pub fn malformed(field: &'static str, err: MoneyError) -> Self {
        LedgerError::MalformedAmount {
            field,
            reason: err.to_string(),
        }
    }

    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::MalformedAmount { .. } => "MALFORMED_AMOUNT",
            LedgerError::InvalidAmount { .. } => "INVALID_AMOUNT",
            LedgerError::InvalidIdentity { .. } => "INVALID_IDENTITY",
            LedgerError::SelfTransfer(_) => "SELF_TRANSFER",
            LedgerError::AlreadyExists(_) => "ALREADY_EXISTS",
            LedgerError::NotFound { .. } => "NOT_FOUND",
            LedgerError::InsufficientBalance => "INSUFFICIENT_BALANCE",
            LedgerError::InvalidBalance(_) => "INVALID_BALANCE",
            LedgerError::DeadlineExceeded => "DEADLINE_EXCEEDED",
            LedgerError::PersistenceFailure(_) => "PERSISTENCE_FAILURE",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            LedgerError::MalformedAmount { .. }
            | LedgerError::InvalidAmount { .. }
            | LedgerError::InvalidIdentity { .. }
            | LedgerError::SelfTransfer(_)
            | LedgerError::InvalidBalance(_) => 400,
            LedgerError::NotFound { .. } => 404,
            LedgerError::AlreadyExists(_) => 409,
            LedgerError::InsufficientBalance => 422,
            LedgerError::PersistenceFailure(_) => 500,
            LedgerError::DeadlineExceeded => 504,
        }
    }

    /// Errors whose message may reach the client verbatim
    pub fn is_client_visible(&self) -> bool {
        !matches!(self, LedgerError::PersistenceFailure(_))
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError::PersistenceFailure(e.to_string())
    }
}
