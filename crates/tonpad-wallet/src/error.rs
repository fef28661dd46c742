//! Wallet error types.
//!
//! Display strings are the user-facing messages shown by the form.

use std::fmt;

use thiserror::Error;

/// The two user-triggered operations of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Resolve,
    Submit,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Resolve => "address lookup",
            Operation::Submit => "transfer",
        })
    }
}

/// Errors surfaced to the user by a wallet session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// The phrase could not be turned into a key. The cause is logged, not shown.
    #[error("Failed to derive wallet address from mnemonic.")]
    Derivation,

    /// Balance or asset lookup failed.
    #[error("Failed to fetch wallet details.")]
    Fetch,

    /// Any failure while building or submitting a transfer.
    #[error("Failed to send TON: {0}")]
    Transfer(String),

    /// The same operation is already running.
    #[error("{0} already in progress")]
    Busy(Operation),
}
