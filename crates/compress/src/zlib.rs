//! Zlib helpers for the token stream.
//!
//! Built on [`flate2`](https://docs.rs/flate2). The helpers expose one-shot
//! buffer conversions; higher layers own streaming and framing decisions.

use std::io::{self, Read, Write};
use std::num::NonZeroU8;

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

/// Compression levels recognised by the zlib encoder.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompressionLevel {
    /// Favour speed over compression ratio.
    Fast,
    /// Use zlib's default balance between speed and ratio.
    Default,
    /// Favour the best possible compression ratio.
    Best,
    /// Use an explicit zlib compression level in the range `1..=9`.
    Precise(NonZeroU8),
}

impl From<CompressionLevel> for Compression {
    fn from(level: CompressionLevel) -> Self {
        match level {
            CompressionLevel::Fast => Compression::fast(),
            CompressionLevel::Default => Compression::default(),
            CompressionLevel::Best => Compression::best(),
            CompressionLevel::Precise(level) => Compression::new(u32::from(level.get())),
        }
    }
}

/// Compresses `data` into a fresh buffer using the requested level.
///
/// # Errors
///
/// Propagates any failure reported by the zlib encoder.
pub fn compress_to_vec(data: &[u8], level: CompressionLevel) -> io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), level.into());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Decompresses a zlib stream into a fresh buffer.
///
/// # Errors
///
/// Returns an error when the payload is not a complete, valid zlib stream.
pub fn decompress_to_vec(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut output = Vec::new();
    decoder.read_to_end(&mut output)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_at_every_named_level() {
        let payload: Vec<u8> = (0..4096u32).map(|i| (i % 7) as u8).collect();
        let levels = [
            CompressionLevel::Fast,
            CompressionLevel::Default,
            CompressionLevel::Best,
            CompressionLevel::Precise(NonZeroU8::new(6).unwrap()),
        ];

        for level in levels {
            let compressed = compress_to_vec(&payload, level).expect("compress");
            assert_eq!(decompress_to_vec(&compressed).expect("decompress"), payload);
        }
    }

    #[test]
    fn truncated_stream_is_rejected() {
        let compressed =
            compress_to_vec(b"truncate me", CompressionLevel::Default).expect("compress");
        assert!(decompress_to_vec(&compressed[..compressed.len() - 2]).is_err());
    }

    #[test]
    fn empty_payload_round_trips() {
        let compressed = compress_to_vec(b"", CompressionLevel::Default).expect("compress");
        assert!(decompress_to_vec(&compressed).expect("decompress").is_empty());
    }
}
