//! Strong checksum dispatch for signature generation and verification.

use checksums::strong::{Md4, Md5, Sha1, Sha256, Xxh3, Xxh3_128, Xxh64};
use protocol::{ChecksumKind, SessionContext};

/// Runtime-dispatched strong checksum strategy for a session.
///
/// Wraps the negotiated [`ChecksumKind`] and applies the session seed the way
/// the C implementation does: the MD and SHA families append the seed as four
/// little-endian bytes after the hashed data (only when nonzero), while the
/// xxHash family uses it as the native hasher seed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SignatureAlgorithm {
    kind: ChecksumKind,
}

impl SignatureAlgorithm {
    /// Creates a dispatcher for the given checksum kind.
    #[must_use]
    pub const fn from_kind(kind: ChecksumKind) -> Self {
        Self { kind }
    }

    /// Creates the dispatcher a session context selects.
    #[must_use]
    pub const fn for_session(ctx: &SessionContext) -> Self {
        Self::from_kind(ctx.checksum())
    }

    /// Returns the checksum kind behind the dispatcher.
    #[must_use]
    pub const fn kind(self) -> ChecksumKind {
        self.kind
    }

    /// Returns the full digest width produced by the algorithm in bytes.
    #[must_use]
    pub const fn digest_len(self) -> usize {
        self.kind.digest_len()
    }

    /// Computes a per-block strong digest truncated to `len` bytes.
    ///
    /// Truncation is a plain prefix of the full digest; `len` values at or
    /// beyond the digest width return the full digest.
    #[must_use]
    pub fn block_digest(self, data: &[u8], seed: u32, len: usize) -> Vec<u8> {
        let mut hasher = self.block_hasher(seed);
        hasher.update(data);
        let mut digest = hasher.finalize();
        digest.truncate(len);
        digest
    }

    /// Creates a streaming hasher configured for per-block digests.
    #[must_use]
    pub fn block_hasher(self, seed: u32) -> StrongHasher {
        StrongHasher::new(self.kind, seed)
    }

    /// Computes the whole-file digest for already-resident data.
    ///
    /// Callers take the seed from
    /// [`SessionContext::whole_file_seed`](protocol::SessionContext::whole_file_seed),
    /// which is zero below protocol 30.
    #[must_use]
    pub fn file_digest(self, data: &[u8], seed: u32) -> Vec<u8> {
        let mut hasher = self.file_hasher(seed);
        hasher.update(data);
        hasher.finalize()
    }

    /// Creates a streaming hasher configured for the whole-file digest.
    #[must_use]
    pub fn file_hasher(self, seed: u32) -> StrongHasher {
        StrongHasher::new(self.kind, seed)
    }
}

enum HasherState {
    Md4(Md4),
    Md5(Md5),
    Sha1(Sha1),
    Sha256(Sha256),
    Xxh64(Xxh64),
    Xxh3(Xxh3),
    Xxh3_128(Xxh3_128),
}

/// Streaming strong-checksum accumulator with the session seed applied.
///
/// For the MD and SHA families a nonzero seed is fed as four little-endian
/// bytes after the data when the digest is finalised; the xxHash family is
/// seeded at construction.
pub struct StrongHasher {
    state: HasherState,
    trailer: Option<[u8; 4]>,
}

impl StrongHasher {
    fn new(kind: ChecksumKind, seed: u32) -> Self {
        let appended_seed = (seed != 0).then(|| seed.to_le_bytes());
        let (state, trailer) = match kind {
            ChecksumKind::Md4 => (HasherState::Md4(Md4::new()), appended_seed),
            ChecksumKind::Md5 => (HasherState::Md5(Md5::new()), appended_seed),
            ChecksumKind::Sha1 => (HasherState::Sha1(Sha1::new()), appended_seed),
            ChecksumKind::Sha256 => (HasherState::Sha256(Sha256::new()), appended_seed),
            ChecksumKind::Xxh64 => (HasherState::Xxh64(Xxh64::new(u64::from(seed))), None),
            ChecksumKind::Xxh3 => (HasherState::Xxh3(Xxh3::new(u64::from(seed))), None),
            ChecksumKind::Xxh3_128 => {
                (HasherState::Xxh3_128(Xxh3_128::new(u64::from(seed))), None)
            }
        };
        Self { state, trailer }
    }

    /// Feeds additional bytes into the digest state.
    pub fn update(&mut self, data: &[u8]) {
        match &mut self.state {
            HasherState::Md4(hasher) => hasher.update(data),
            HasherState::Md5(hasher) => hasher.update(data),
            HasherState::Sha1(hasher) => hasher.update(data),
            HasherState::Sha256(hasher) => hasher.update(data),
            HasherState::Xxh64(hasher) => hasher.update(data),
            HasherState::Xxh3(hasher) => hasher.update(data),
            HasherState::Xxh3_128(hasher) => hasher.update(data),
        }
    }

    /// Finalises the digest, appending the seed trailer where the algorithm
    /// calls for one.
    #[must_use]
    pub fn finalize(mut self) -> Vec<u8> {
        if let Some(trailer) = self.trailer.take() {
            self.update(&trailer);
        }
        match self.state {
            HasherState::Md4(hasher) => hasher.finalize().to_vec(),
            HasherState::Md5(hasher) => hasher.finalize().to_vec(),
            HasherState::Sha1(hasher) => hasher.finalize().to_vec(),
            HasherState::Sha256(hasher) => hasher.finalize().to_vec(),
            HasherState::Xxh64(hasher) => hasher.finalize().to_vec(),
            HasherState::Xxh3(hasher) => hasher.finalize().to_vec(),
            HasherState::Xxh3_128(hasher) => hasher.finalize().to_vec(),
        }
    }
}
