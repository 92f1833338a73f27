//! Error types shared by the pure (non-RPC) parts of the core crate

use thiserror::Error;

/// Failures while converting between UI amounts and raw token units
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount is empty")]
    Empty,

    #[error("Invalid amount: {0}")]
    Invalid(String),

    #[error("Amount must not be negative")]
    Negative,

    #[error("Amount has {found} decimal places but the token only supports {decimals}")]
    TooPrecise { found: u32, decimals: u8 },

    #[error("Amount does not fit in a u64")]
    Overflow,

    #[error("Decimals must be between 0 and {max}, got {found}")]
    InvalidDecimals { found: u8, max: u8 },
}

/// Failures while encoding or decoding serialized transactions
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Invalid base64 transaction: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid transaction format: {0}")]
    Bincode(#[from] bincode::Error),
}

/// Failures while assembling instruction lists
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("SPL token instruction error: {0}")]
    Program(#[from] solana_program::program_error::ProgramError),

    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}
