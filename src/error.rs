//! Error types for the sealdir core.
//!
//! Everything below the application layer reports failures through [`Error`].
//! Per-file errors never escape the batch: the orchestrator turns them into
//! `(path, reason)` entries of a [`BatchResult`](crate::types::BatchResult).

use std::io;

use thiserror::Error;

/// Result type alias using the core [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid key length: expected {expected}, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    #[error("invalid nonce length: expected {expected}, got {got}")]
    InvalidNonceLength { expected: usize, got: usize },

    #[error("message of {0} bytes exceeds the keystream counter range")]
    MessageTooLong(usize),

    /// The input carries no recognizable container trailer.
    #[error("container trailer not found")]
    TrailerNotFound,

    /// A trailer marker was found but no valid record could be parsed.
    #[error("malformed container trailer: {0}")]
    TrailerParse(String),

    /// Tag mismatch: wrong password, corrupted ciphertext or tampering.
    #[error("authentication failed: wrong password or corrupted data")]
    AuthenticationFailure,

    #[error("read failed: {0}")]
    IoRead(#[source] io::Error),

    #[error("write failed: {0}")]
    IoWrite(#[source] io::Error),

    #[error("not a regular file")]
    NotRegularFile,

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("random number generator failed: {0}")]
    Rng(String),

    #[error("password cannot be empty")]
    EmptyPassword,

    #[error("worker count must be at least 1")]
    InvalidWorkerCount,

    #[error("failed to start worker pool: {0}")]
    WorkerPool(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_lengths() {
        let err = Error::InvalidKeyLength { expected: 32, got: 7 };
        assert_eq!(err.to_string(), "invalid key length: expected 32, got 7");
    }
}
