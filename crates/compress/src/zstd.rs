//! Zstandard helpers for the token stream.
//!
//! The interface mirrors the zlib helpers so the protocol layer can swap
//! algorithms without reworking its plumbing.

use std::io;

/// Default zstd compression level used when callers do not specify one.
pub const DEFAULT_LEVEL: i32 = 3;

/// Compresses `data` into a fresh buffer at the given zstd level.
///
/// # Errors
///
/// Propagates any failure reported by the zstd encoder.
pub fn compress_to_vec(data: &[u8], level: i32) -> io::Result<Vec<u8>> {
    ::zstd::stream::encode_all(data, level).map_err(io::Error::other)
}

/// Decompresses a zstd frame into a fresh buffer.
///
/// # Errors
///
/// Returns an error when the payload is not a complete, valid zstd frame.
pub fn decompress_to_vec(data: &[u8]) -> io::Result<Vec<u8>> {
    ::zstd::stream::decode_all(data).map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_preserves_payload() {
        let payload: Vec<u8> = (0..8192u32).map(|i| (i % 13) as u8).collect();
        let compressed = compress_to_vec(&payload, DEFAULT_LEVEL).expect("compress");
        assert_eq!(decompress_to_vec(&compressed).expect("decompress"), payload);
    }

    #[test]
    fn truncated_frame_is_rejected() {
        let compressed = compress_to_vec(b"truncate me please", DEFAULT_LEVEL).expect("compress");
        assert!(decompress_to_vec(&compressed[..compressed.len() / 2]).is_err());
    }
}
