//! Error types for the matching and patching paths.

use std::io;

use thiserror::Error;

use checksums::RollingError;

/// Errors produced while indexing a signature or generating a delta.
#[derive(Debug, Error)]
pub enum MatchError {
    /// The signature contradicts itself and cannot be matched against.
    #[error("invalid signature: {0}")]
    SignatureInvalid(&'static str),
    /// Indexing the signature would exceed the session memory cap.
    #[error("signature index needs {needed} bytes but the session caps memory at {limit}")]
    ResourceLimit {
        /// Bytes the index would commit.
        needed: u64,
        /// The configured cap.
        limit: u64,
    },
    /// The rolling checksum reported an impossible window transition.
    #[error(transparent)]
    Rolling(#[from] RollingError),
}

/// Errors produced while applying a delta.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// The delta references data the basis does not have.
    #[error("invalid delta: {0}")]
    DeltaInvalid(&'static str),
    /// The reconstructed bytes failed whole-file digest verification.
    #[error("reconstructed data failed whole-file digest verification")]
    IntegrityFailure,
    /// An I/O failure surfaced by the output writer.
    #[error(transparent)]
    Io(#[from] io::Error),
}
