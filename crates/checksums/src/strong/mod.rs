//! Strong checksum implementations backed by well-known hash algorithms.
//!
//! Delta transfer negotiates the strong checksum algorithm from the protocol
//! version and the per-session checksum-name exchange. This module exposes
//! streaming wrappers for MD4, MD5, SHA-1, SHA-256, XXH64, XXH3/64, and
//! XXH3/128 so higher layers can compose the negotiated strategy without
//! reimplementing the hashing primitives.

mod md4;
mod md5;
mod sha1;
mod sha256;
mod xxhash;

pub use md4::Md4;
pub use md5::Md5;
pub use sha1::Sha1;
pub use sha256::Sha256;
pub use xxhash::{Xxh3, Xxh3_128, Xxh64};

/// Trait implemented by strong checksum algorithms used during delta transfer.
///
/// Implementors provide a streaming interface: callers feed data incrementally
/// via [`Self::update`] and then obtain the final digest through
/// [`Self::finalize`]. The associated [`DIGEST_LEN`](Self::DIGEST_LEN)
/// constant exposes the byte width of the resulting hash so higher layers can
/// size buffers without hard-coding algorithm-specific knowledge.
pub trait StrongDigest: Sized {
    /// Type used to parameterise a new digest instance.
    type Seed: Default;

    /// Type returned when finalising the digest.
    type Digest: AsRef<[u8]> + Copy;

    /// Length of the final digest in bytes.
    const DIGEST_LEN: usize;

    /// Creates a new hasher with an empty state.
    fn new() -> Self {
        Self::with_seed(Default::default())
    }

    /// Creates a new hasher using the provided seed value.
    fn with_seed(seed: Self::Seed) -> Self;

    /// Feeds additional bytes into the digest state.
    fn update(&mut self, data: &[u8]);

    /// Finalises the digest and returns the resulting hash.
    fn finalize(self) -> Self::Digest;

    /// Convenience helper that hashes `data` in a single call.
    fn digest(data: &[u8]) -> Self::Digest {
        Self::digest_with_seed(Default::default(), data)
    }

    /// Convenience helper that hashes `data` using an explicit seed value.
    fn digest_with_seed(seed: Self::Seed, data: &[u8]) -> Self::Digest {
        let mut hasher = Self::with_seed(seed);
        hasher.update(data);
        hasher.finalize()
    }
}
