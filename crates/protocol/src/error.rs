//! Error types surfaced by the negotiation and wire layers.

use std::io;

use thiserror::Error;

use compress::CompressionAlgorithm;

use crate::checksum::ChecksumKind;
use crate::version::ProtocolVersion;

/// Errors produced while agreeing on a protocol version or checksum.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum NegotiationError {
    /// The agreed version falls below the supported floor.
    #[error(
        "agreed protocol version {agreed} is unsupported (local {local}, remote {remote}, supported {oldest}-{newest})",
        oldest = ProtocolVersion::OLDEST,
        newest = ProtocolVersion::NEWEST
    )]
    ProtocolUnsupported {
        /// Version announced locally.
        local: u8,
        /// Version announced by the peer.
        remote: u8,
        /// Version that would have been agreed.
        agreed: u8,
    },
    /// The checksum name lists share no algorithm valid for the session.
    #[error("no mutual strong checksum; client offered {offered:?}")]
    NoMutualChecksum {
        /// Names offered by the client, in preference order.
        offered: Vec<String>,
    },
}

/// Errors produced when a session parameter contradicts the agreed protocol.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum ConfigError {
    /// The requested strong checksum is not valid for the protocol version.
    #[error("checksum {checksum} is not supported by protocol {protocol}")]
    ChecksumUnsupported {
        /// The requested checksum kind.
        checksum: ChecksumKind,
        /// The agreed protocol version.
        protocol: ProtocolVersion,
    },
    /// The requested compression algorithm is not valid for the protocol
    /// version.
    #[error("compression {algorithm} is not supported by protocol {protocol}", algorithm = .algorithm.name())]
    CompressionUnsupported {
        /// The requested compression algorithm.
        algorithm: CompressionAlgorithm,
        /// The agreed protocol version.
        protocol: ProtocolVersion,
    },
}

/// Errors produced by the wire codecs.
#[derive(Debug, Error)]
pub enum WireError {
    /// The input is truncated or internally inconsistent.
    #[error("malformed wire data: {0}")]
    Malformed(&'static str),
    /// An I/O failure surfaced by the underlying reader or writer.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl WireError {
    /// Normalises read-side I/O errors: truncation becomes a malformed-input
    /// report, everything else stays an I/O failure.
    #[must_use]
    pub fn from_read_error(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            WireError::Malformed("truncated input")
        } else {
            WireError::Io(err)
        }
    }

    /// Reports whether the error describes malformed input rather than an
    /// environment failure.
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(self, WireError::Malformed(_))
    }
}
