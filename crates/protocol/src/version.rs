//! Strongly typed protocol version representation and feature cut-overs.

use core::fmt;
use core::num::NonZeroU8;

use compress::CompressionAlgorithm;

use crate::checksum::ChecksumKind;

/// Oldest protocol version the implementation speaks.
pub const OLDEST_SUPPORTED_PROTOCOL: u8 = 20;

/// Newest protocol version the implementation speaks.
pub const NEWEST_SUPPORTED_PROTOCOL: u8 = 32;

/// A single agreed protocol version in the supported range.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ProtocolVersion(NonZeroU8);

impl ProtocolVersion {
    const fn new_const(value: u8) -> Self {
        match NonZeroU8::new(value) {
            Some(v) => Self(v),
            None => panic!("protocol version must be non-zero"),
        }
    }

    /// The oldest supported protocol version.
    pub const OLDEST: ProtocolVersion = ProtocolVersion::new_const(OLDEST_SUPPORTED_PROTOCOL);

    /// The newest supported protocol version.
    pub const NEWEST: ProtocolVersion = ProtocolVersion::new_const(NEWEST_SUPPORTED_PROTOCOL);

    /// First protocol version using the variable-length integer codec and the
    /// explicit `s2length` field in the sum head.
    pub const VARINT_INTRODUCED: ProtocolVersion = ProtocolVersion::new_const(27);

    /// First protocol version defaulting to MD5 strong checksums and seeding
    /// the whole-file digest.
    pub const MD5_INTRODUCED: ProtocolVersion = ProtocolVersion::new_const(30);

    /// First protocol version negotiating the strong checksum per session.
    pub const CHECKSUM_NEGOTIATION_INTRODUCED: ProtocolVersion = ProtocolVersion::new_const(32);

    /// Creates a version from its numeric identifier when in range.
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value < OLDEST_SUPPORTED_PROTOCOL || value > NEWEST_SUPPORTED_PROTOCOL {
            return None;
        }
        Some(Self::new_const(value))
    }

    /// Returns the numeric protocol identifier.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0.get()
    }

    /// Reports whether the inclusive supported range contains `value`.
    #[must_use]
    pub const fn is_supported_protocol_number(value: u8) -> bool {
        value >= OLDEST_SUPPORTED_PROTOCOL && value <= NEWEST_SUPPORTED_PROTOCOL
    }

    /// Reports whether integers on this session use the variable-length codec.
    #[must_use]
    pub const fn uses_varint(self) -> bool {
        self.as_u8() >= Self::VARINT_INTRODUCED.as_u8()
    }

    /// Reports whether the sum head carries an explicit `s2length` field.
    ///
    /// Older peers infer the short-sum length instead of reading it.
    #[must_use]
    pub const fn sum_head_carries_s2length(self) -> bool {
        self.as_u8() >= Self::VARINT_INTRODUCED.as_u8()
    }

    /// Reports whether the weak rolling checksum folds the session seed into
    /// its upper half at read-out.
    #[must_use]
    pub const fn folds_weak_seed(self) -> bool {
        self.as_u8() >= Self::VARINT_INTRODUCED.as_u8()
    }

    /// Reports whether the whole-file digest mixes in the session seed.
    #[must_use]
    pub const fn seeds_whole_file_digest(self) -> bool {
        self.as_u8() >= Self::MD5_INTRODUCED.as_u8()
    }

    /// Returns the default strong checksum for the version.
    ///
    /// Protocol 32 sessions may override the default through
    /// [`negotiate_checksum`](crate::negotiate_checksum).
    #[must_use]
    pub const fn default_checksum(self) -> ChecksumKind {
        if self.as_u8() < Self::MD5_INTRODUCED.as_u8() {
            ChecksumKind::Md4
        } else {
            ChecksumKind::Md5
        }
    }

    /// Returns the largest block length the version permits.
    #[must_use]
    pub const fn max_block_length(self) -> u32 {
        if self.as_u8() < Self::MD5_INTRODUCED.as_u8() {
            8 * 1024
        } else {
            128 * 1024
        }
    }

    /// Reports whether the version can carry a compressed token stream using
    /// the given algorithm.
    #[must_use]
    pub const fn supports_compression(self, algorithm: CompressionAlgorithm) -> bool {
        match algorithm {
            CompressionAlgorithm::Zlib => self.as_u8() >= 30,
            CompressionAlgorithm::Zstd => self.as_u8() >= 31,
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

impl TryFrom<u8> for ProtocolVersion {
    type Error = crate::NegotiationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        ProtocolVersion::new(value).ok_or(crate::NegotiationError::ProtocolUnsupported {
            local: value,
            remote: value,
            agreed: value,
        })
    }
}
