//! Strong checksum identifiers shared across the negotiation and signature
//! layers.

use core::fmt;
use core::str::FromStr;

use crate::version::ProtocolVersion;

/// Strong checksum algorithms a session can negotiate.
///
/// The tag only identifies the algorithm; concrete hashing lives in the
/// `checksums` crate and is wired up by the signature layer.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ChecksumKind {
    /// MD4, the default below protocol 30.
    Md4,
    /// MD5, the default for protocols 30 and 31.
    Md5,
    /// SHA-1, negotiable on protocol 32.
    Sha1,
    /// SHA-256, negotiable on protocol 32.
    Sha256,
    /// XXH64, negotiable on protocol 32.
    Xxh64,
    /// XXH3/64, negotiable on protocol 32.
    Xxh3,
    /// XXH3/128, negotiable on protocol 32.
    Xxh3_128,
}

impl ChecksumKind {
    /// All checksum kinds, in the preference order used during negotiation.
    pub const ALL: [ChecksumKind; 7] = [
        ChecksumKind::Xxh3_128,
        ChecksumKind::Xxh3,
        ChecksumKind::Xxh64,
        ChecksumKind::Sha256,
        ChecksumKind::Sha1,
        ChecksumKind::Md5,
        ChecksumKind::Md4,
    ];

    /// Returns the canonical negotiation name for the algorithm.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ChecksumKind::Md4 => "md4",
            ChecksumKind::Md5 => "md5",
            ChecksumKind::Sha1 => "sha1",
            ChecksumKind::Sha256 => "sha256",
            ChecksumKind::Xxh64 => "xxh64",
            ChecksumKind::Xxh3 => "xxh3",
            ChecksumKind::Xxh3_128 => "xxh128",
        }
    }

    /// Returns the full digest width in bytes.
    #[must_use]
    pub const fn digest_len(self) -> usize {
        match self {
            ChecksumKind::Md4 | ChecksumKind::Md5 | ChecksumKind::Xxh3_128 => 16,
            ChecksumKind::Sha1 => 20,
            ChecksumKind::Sha256 => 32,
            ChecksumKind::Xxh64 | ChecksumKind::Xxh3 => 8,
        }
    }

    /// Reports whether the given protocol version may use this algorithm.
    ///
    /// MD4 is valid everywhere, MD5 from protocol 30, and the remaining kinds
    /// only on protocol 32 sessions that negotiated them.
    #[must_use]
    pub const fn supported_by(self, protocol: ProtocolVersion) -> bool {
        match self {
            ChecksumKind::Md4 => true,
            ChecksumKind::Md5 => protocol.as_u8() >= ProtocolVersion::MD5_INTRODUCED.as_u8(),
            _ => {
                protocol.as_u8() >= ProtocolVersion::CHECKSUM_NEGOTIATION_INTRODUCED.as_u8()
            }
        }
    }
}

impl fmt::Display for ChecksumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChecksumKind {
    type Err = UnknownChecksumName;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "md4" => Ok(ChecksumKind::Md4),
            "md5" => Ok(ChecksumKind::Md5),
            "sha1" => Ok(ChecksumKind::Sha1),
            "sha256" => Ok(ChecksumKind::Sha256),
            "xxh64" | "xxhash" => Ok(ChecksumKind::Xxh64),
            "xxh3" => Ok(ChecksumKind::Xxh3),
            "xxh128" => Ok(ChecksumKind::Xxh3_128),
            other => Err(UnknownChecksumName {
                name: other.to_owned(),
            }),
        }
    }
}

/// Error returned when parsing an unrecognised checksum name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownChecksumName {
    /// The name that failed to parse.
    pub name: String,
}

impl fmt::Display for UnknownChecksumName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown checksum name: {:?}", self.name)
    }
}

impl std::error::Error for UnknownChecksumName {}
