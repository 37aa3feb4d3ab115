//! Error taxonomy for the escrow engine
//!
//! Every error aborts the whole operation with no partial mutation;
//! callers see the error kind plus a human-readable reason string.

use thiserror::Error;

/// Result type for escrow operations
pub type Result<T> = std::result::Result<T, Error>;

/// Escrow errors
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or incorrect role / ownership
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// Operation invalid for the current state
    #[error("State error: {0}")]
    State(String),

    /// Attached amount mismatched, or zero where nonzero is required
    #[error("Value error: {0}")]
    Value(String),

    /// Deliverer below minimum collateral
    #[error("Insufficient stake: {0}")]
    InsufficientStake(String),

    /// Withdraw/unstake/burn exceeds available balance
    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),

    /// Unknown order id or address
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Concurrency error (actor mailbox closed, response dropped)
    #[error("Concurrency error: {0}")]
    Concurrency(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
