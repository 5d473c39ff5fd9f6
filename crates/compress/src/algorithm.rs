use std::io;
use std::str::FromStr;

use crate::zlib;
use crate::zstd;

/// Compression algorithms recognised for the token stream.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CompressionAlgorithm {
    /// Classic zlib/deflate compression, available from protocol 30.
    Zlib,
    /// Zstandard compression, an opt-in from protocol 31.
    Zstd,
}

impl CompressionAlgorithm {
    /// Returns the canonical name used during negotiation and diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            CompressionAlgorithm::Zlib => "zlib",
            CompressionAlgorithm::Zstd => "zstd",
        }
    }

    /// Returns the algorithm used when callers enable compression without a
    /// specific choice.
    #[must_use]
    pub const fn default_algorithm() -> Self {
        CompressionAlgorithm::Zlib
    }

    /// Compresses `data` into a fresh buffer.
    ///
    /// # Errors
    ///
    /// Propagates failures reported by the underlying codec.
    pub fn compress(self, data: &[u8]) -> io::Result<Vec<u8>> {
        match self {
            CompressionAlgorithm::Zlib => {
                zlib::compress_to_vec(data, zlib::CompressionLevel::Default)
            }
            CompressionAlgorithm::Zstd => zstd::compress_to_vec(data, zstd::DEFAULT_LEVEL),
        }
    }

    /// Decompresses `data` into a fresh buffer.
    ///
    /// # Errors
    ///
    /// Returns an error when the payload is not a valid stream for this
    /// algorithm, including truncated input.
    pub fn decompress(self, data: &[u8]) -> io::Result<Vec<u8>> {
        match self {
            CompressionAlgorithm::Zlib => zlib::decompress_to_vec(data),
            CompressionAlgorithm::Zstd => zstd::decompress_to_vec(data),
        }
    }
}

impl Default for CompressionAlgorithm {
    fn default() -> Self {
        Self::default_algorithm()
    }
}

impl FromStr for CompressionAlgorithm {
    type Err = io::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "zlib" => Ok(CompressionAlgorithm::Zlib),
            "zstd" => Ok(CompressionAlgorithm::Zstd),
            other => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unknown compression algorithm: {other:?}"),
            )),
        }
    }
}
