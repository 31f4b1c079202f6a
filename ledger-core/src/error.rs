//! Error types for the ledger core

use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// Storage error (RocksDB or collaborator state view)
    #[error("storage error: {0}")]
    Storage(String),

    /// Malformed wire or record bytes
    #[error("codec error: {0}")]
    Codec(String),

    /// Checked addition overflowed
    #[error("overflow: {current} + {amount}")]
    Overflow {
        /// Value before the addition
        current: u64,
        /// Amount being added
        amount: u64,
    },

    /// Checked subtraction underflowed
    #[error("underflow: {current} - {amount}")]
    Underflow {
        /// Value before the subtraction
        current: u64,
        /// Amount being subtracted
        amount: u64,
    },

    /// Checked multiplication overflowed
    #[error("overflow: {lhs} * {rhs}")]
    MulOverflow {
        /// Left operand
        lhs: u64,
        /// Right operand
        rhs: u64,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for overflow/underflow failures, which must never be observed as
    /// a partial write.
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Error::Overflow { .. } | Error::Underflow { .. } | Error::MulOverflow { .. }
        )
    }
}

impl From<rocksdb::Error> for Error {
    fn from(err: rocksdb::Error) -> Self {
        Error::Storage(err.to_string())
    }
}
