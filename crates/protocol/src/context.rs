//! Immutable per-session parameters shared by the delta-transfer pipeline.

use compress::CompressionAlgorithm;

use crate::checksum::ChecksumKind;
use crate::error::ConfigError;
use crate::version::ProtocolVersion;

/// Negotiated, immutable parameters of a delta-transfer session.
///
/// The context replaces the process-scope toggles of classic implementations:
/// the checksum seed, strong checksum choice, compression selection, and the
/// caller-configured memory cap all travel here and are passed explicitly to
/// every operation. A context is cheap to clone and never mutated after the
/// builder-style constructors complete.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SessionContext {
    protocol: ProtocolVersion,
    checksum_seed: u32,
    checksum: ChecksumKind,
    compression: Option<CompressionAlgorithm>,
    memory_limit: Option<u64>,
}

impl SessionContext {
    /// Creates a context with the protocol's defaults: a zero seed, the
    /// default strong checksum, no compression, and no memory cap.
    #[must_use]
    pub const fn new(protocol: ProtocolVersion) -> Self {
        Self {
            protocol,
            checksum_seed: 0,
            checksum: protocol.default_checksum(),
            compression: None,
            memory_limit: None,
        }
    }

    /// Sets the checksum seed the sender chose for this session.
    ///
    /// Zero is permitted and leaves all digests unseeded.
    #[must_use]
    pub const fn with_checksum_seed(mut self, seed: u32) -> Self {
        self.checksum_seed = seed;
        self
    }

    /// Selects the strong checksum for the session.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ChecksumUnsupported`] when the agreed protocol
    /// version cannot use the requested algorithm.
    pub fn with_checksum(mut self, checksum: ChecksumKind) -> Result<Self, ConfigError> {
        if !checksum.supported_by(self.protocol) {
            return Err(ConfigError::ChecksumUnsupported {
                checksum,
                protocol: self.protocol,
            });
        }
        self.checksum = checksum;
        Ok(self)
    }

    /// Selects the token-stream compression for the session.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::CompressionUnsupported`] when the agreed
    /// protocol version cannot carry the requested algorithm.
    pub fn with_compression(
        mut self,
        compression: Option<CompressionAlgorithm>,
    ) -> Result<Self, ConfigError> {
        if let Some(algorithm) = compression {
            if !self.protocol.supports_compression(algorithm) {
                return Err(ConfigError::CompressionUnsupported {
                    algorithm,
                    protocol: self.protocol,
                });
            }
        }
        self.compression = compression;
        Ok(self)
    }

    /// Caps the memory the receiver may commit to signature indexing.
    #[must_use]
    pub const fn with_memory_limit(mut self, bytes: u64) -> Self {
        self.memory_limit = Some(bytes);
        self
    }

    /// Returns the agreed protocol version.
    #[must_use]
    pub const fn protocol(&self) -> ProtocolVersion {
        self.protocol
    }

    /// Returns the session checksum seed.
    #[must_use]
    pub const fn checksum_seed(&self) -> u32 {
        self.checksum_seed
    }

    /// Returns the negotiated strong checksum.
    #[must_use]
    pub const fn checksum(&self) -> ChecksumKind {
        self.checksum
    }

    /// Returns the negotiated token-stream compression, if any.
    #[must_use]
    pub const fn compression(&self) -> Option<CompressionAlgorithm> {
        self.compression
    }

    /// Returns the caller-configured memory cap, if any.
    #[must_use]
    pub const fn memory_limit(&self) -> Option<u64> {
        self.memory_limit
    }

    /// Returns the seed folded into weak checksums at read-out.
    ///
    /// Zero below protocol 27, where the weak checksum is never seeded.
    #[must_use]
    pub const fn weak_seed(&self) -> u32 {
        if self.protocol.folds_weak_seed() {
            self.checksum_seed
        } else {
            0
        }
    }

    /// Returns the seed mixed into per-block strong digests.
    #[must_use]
    pub const fn block_seed(&self) -> u32 {
        self.checksum_seed
    }

    /// Returns the seed mixed into the whole-file digest.
    ///
    /// Zero below protocol 30, where the whole-file digest is unseeded.
    #[must_use]
    pub const fn whole_file_seed(&self) -> u32 {
        if self.protocol.seeds_whole_file_digest() {
            self.checksum_seed
        } else {
            0
        }
    }
}
