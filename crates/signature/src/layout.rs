//! Signature layout calculation matching `generator.c:sum_sizes_sqroot`.
//!
//! The heuristic follows the C implementation line for line: small files use
//! a fixed 700-byte block, larger files the power-of-two square-root
//! construction (whose result is always a multiple of 8), and everything is
//! clamped to the protocol-specific maximum. The strong-sum truncation uses
//! the `BLOCKSUM_BIAS` bit-count heuristic bounded by the negotiated minimum
//! and the full digest width.

use core::fmt;
use core::num::{NonZeroU32, NonZeroU8};

use thiserror::Error;

use protocol::{ChecksumKind, ProtocolVersion};

/// Block length used when the basis is small (`BLOCK_SIZE` upstream).
pub const BLOCK_SIZE: u32 = 700;

/// Bias applied when computing strong checksum lengths for larger files.
pub const BLOCKSUM_BIAS: i32 = 10;

/// Parameters describing a signature layout computation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SignatureLayoutParams {
    file_length: u64,
    forced_block_length: Option<NonZeroU32>,
    protocol: ProtocolVersion,
    checksum: ChecksumKind,
    checksum_length: NonZeroU8,
}

impl SignatureLayoutParams {
    /// Creates a new descriptor.
    ///
    /// `checksum_length` is the negotiated minimum strong-sum truncation,
    /// normally 2; senders forcing whole-digest sums pass the full width.
    #[must_use]
    pub const fn new(
        file_length: u64,
        forced_block_length: Option<NonZeroU32>,
        protocol: ProtocolVersion,
        checksum: ChecksumKind,
        checksum_length: NonZeroU8,
    ) -> Self {
        Self {
            file_length,
            forced_block_length,
            protocol,
            checksum,
            checksum_length,
        }
    }

    /// Returns the basis length in bytes.
    #[must_use]
    pub const fn file_length(self) -> u64 {
        self.file_length
    }

    /// Returns the caller-specified block length, if any.
    #[must_use]
    pub const fn forced_block_length(self) -> Option<NonZeroU32> {
        self.forced_block_length
    }

    /// Returns the negotiated protocol version.
    #[must_use]
    pub const fn protocol(self) -> ProtocolVersion {
        self.protocol
    }

    /// Returns the negotiated strong checksum kind.
    #[must_use]
    pub const fn checksum(self) -> ChecksumKind {
        self.checksum
    }

    /// Returns the negotiated minimum strong-sum truncation.
    #[must_use]
    pub const fn checksum_length(self) -> NonZeroU8 {
        self.checksum_length
    }
}

/// Describes the block layout and checksum widths of a signature.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SignatureLayout {
    block_length: NonZeroU32,
    remainder: u32,
    block_count: u64,
    strong_sum_length: NonZeroU8,
}

impl SignatureLayout {
    /// Creates a layout from raw components (used when decoding from the wire).
    #[must_use]
    pub const fn from_raw_parts(
        block_length: NonZeroU32,
        remainder: u32,
        block_count: u64,
        strong_sum_length: NonZeroU8,
    ) -> Self {
        Self {
            block_length,
            remainder,
            block_count,
            strong_sum_length,
        }
    }

    /// Returns the nominal block length in bytes.
    #[must_use]
    pub const fn block_length(self) -> NonZeroU32 {
        self.block_length
    }

    /// Returns the trailing byte count that does not fill a complete block.
    #[must_use]
    pub const fn remainder(self) -> u32 {
        self.remainder
    }

    /// Returns the number of blocks in the layout.
    #[must_use]
    pub const fn block_count(self) -> u64 {
        self.block_count
    }

    /// Returns the strong-sum truncation in bytes.
    #[must_use]
    pub const fn strong_sum_length(self) -> NonZeroU8 {
        self.strong_sum_length
    }

    /// Returns the length of block `index`, accounting for the short tail.
    #[must_use]
    pub const fn block_len(self, index: u64) -> u32 {
        if self.remainder != 0 && index + 1 == self.block_count {
            self.remainder
        } else {
            self.block_length.get()
        }
    }

    /// Returns the basis length the layout describes.
    #[must_use]
    pub const fn basis_len(self) -> u64 {
        if self.block_count == 0 {
            return 0;
        }
        let full_blocks = if self.remainder != 0 {
            self.block_count - 1
        } else {
            self.block_count
        };
        full_blocks * self.block_length.get() as u64 + self.remainder as u64
    }
}

impl fmt::Display for SignatureLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} blocks of {} bytes (remainder {}, strong sum {} bytes)",
            self.block_count,
            self.block_length,
            self.remainder,
            self.strong_sum_length
        )
    }
}

/// Errors produced when calculating signature layouts.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum SignatureLayoutError {
    /// File length exceeded `i64::MAX`, which the wire format cannot carry.
    #[error("file length {length} exceeds i64::MAX")]
    FileTooLarge {
        /// Length in bytes of the file being processed.
        length: u64,
    },
    /// Number of blocks exceeded `i32::MAX`.
    #[error("block count {blocks} derived from block length {block_length} exceeds i32::MAX")]
    BlockCountOverflow {
        /// Block length that triggered the overflow.
        block_length: u32,
        /// Block count produced by the sizing heuristic.
        blocks: u64,
    },
    /// A forced block length falls outside the protocol's allowed range.
    #[error("block length {requested} outside allowed range 1..={maximum}")]
    BlockLengthOutOfRange {
        /// The requested block length.
        requested: u32,
        /// The protocol's maximum block length.
        maximum: u32,
    },
    /// The requested strong-sum truncation falls outside the digest's range.
    #[error("strong-sum length {requested} outside allowed range 2..={digest_len}")]
    ChecksumLengthOutOfRange {
        /// The requested truncation in bytes.
        requested: u8,
        /// Full width of the negotiated digest.
        digest_len: u8,
    },
}

/// Calculates the signature layout for a basis using the upstream heuristics.
#[doc(alias = "sum_sizes_sqroot")]
#[allow(clippy::cast_possible_truncation)]
pub fn calculate_signature_layout(
    params: SignatureLayoutParams,
) -> Result<SignatureLayout, SignatureLayoutError> {
    if params.file_length() > i64::MAX as u64 {
        return Err(SignatureLayoutError::FileTooLarge {
            length: params.file_length(),
        });
    }

    let max_block = params.protocol().max_block_length();
    let digest_len = params.checksum().digest_len() as u8;
    let requested_sum = params.checksum_length().get();
    if requested_sum < 2 || requested_sum > digest_len {
        return Err(SignatureLayoutError::ChecksumLengthOutOfRange {
            requested: requested_sum,
            digest_len,
        });
    }

    let block_length = match params.forced_block_length() {
        Some(length) => {
            if length.get() > max_block {
                return Err(SignatureLayoutError::BlockLengthOutOfRange {
                    requested: length.get(),
                    maximum: max_block,
                });
            }
            length.get()
        }
        None => derive_block_length(params.file_length(), max_block),
    };

    let block_length_non_zero =
        NonZeroU32::new(block_length).unwrap_or(NonZeroU32::new(BLOCK_SIZE).expect("non-zero"));

    let mut block_count = params.file_length() / u64::from(block_length);
    let remainder = (params.file_length() % u64::from(block_length)) as u32;
    if remainder != 0 {
        block_count = block_count.saturating_add(1);
    }

    if block_count > i32::MAX as u64 {
        return Err(SignatureLayoutError::BlockCountOverflow {
            block_length,
            blocks: block_count,
        });
    }

    let strong_sum_length = derive_strong_sum_length(
        params.file_length(),
        block_length,
        params.protocol(),
        params.checksum_length(),
        digest_len,
    );

    Ok(SignatureLayout {
        block_length: block_length_non_zero,
        remainder,
        block_count,
        strong_sum_length,
    })
}

fn derive_block_length(file_length: u64, max_block_length: u32) -> u32 {
    if file_length <= u64::from(BLOCK_SIZE) * u64::from(BLOCK_SIZE) {
        return BLOCK_SIZE;
    }

    // Power-of-two square-root estimate, then refine by trying progressively
    // smaller bits; the construction only sets bits >= 8, so the result is a
    // multiple of 8.
    let mut c: u64 = 1;
    let mut l = file_length;
    while l >> 2 != 0 {
        c <<= 1;
        l >>= 2;
    }

    if c >= u64::from(max_block_length) {
        return max_block_length;
    }

    let mut block_length = 0u64;
    let mut current = c;
    while current >= 8 {
        block_length |= current;
        let candidate = u128::from(block_length);
        if u128::from(file_length) < candidate.saturating_mul(candidate) {
            block_length &= !current;
        }
        current >>= 1;
    }

    block_length.max(u64::from(BLOCK_SIZE)) as u32
}

fn derive_strong_sum_length(
    file_length: u64,
    block_length: u32,
    protocol: ProtocolVersion,
    checksum_length: NonZeroU8,
    digest_len: u8,
) -> NonZeroU8 {
    if !protocol.uses_varint() {
        // Pre-27 peers have no field to carry a computed value; both sides
        // assume the negotiated length.
        return checksum_length;
    }

    if checksum_length.get() >= digest_len {
        return NonZeroU8::new(digest_len).unwrap_or(checksum_length);
    }

    let mut bias = BLOCKSUM_BIAS;
    let mut l = file_length;
    while l >> 1 != 0 {
        l >>= 1;
        bias += 2;
    }

    let mut current = block_length;
    while current >> 1 != 0 && bias > 0 {
        current >>= 1;
        bias -= 1;
    }

    let mut strong_len = (bias + 1 - 32 + 7) / 8;
    let min_len = i32::from(checksum_length.get());
    if strong_len < min_len {
        strong_len = min_len;
    }
    let max_len = i32::from(digest_len);
    if strong_len > max_len {
        strong_len = max_len;
    }

    NonZeroU8::new(strong_len as u8).unwrap_or(checksum_length)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(
        length: u64,
        forced: Option<u32>,
        protocol: u8,
        checksum_length: u8,
    ) -> SignatureLayoutParams {
        SignatureLayoutParams::new(
            length,
            forced.and_then(NonZeroU32::new),
            ProtocolVersion::new(protocol).expect("supported protocol"),
            ChecksumKind::Md5,
            NonZeroU8::new(checksum_length).expect("non-zero checksum length"),
        )
    }

    #[test]
    fn small_files_use_the_default_block_size() {
        let layout = calculate_signature_layout(params(32, None, 32, 16)).expect("layout");
        assert_eq!(layout.block_length().get(), 700);
        assert_eq!(layout.block_count(), 1);
        assert_eq!(layout.remainder(), 32);
        assert_eq!(layout.strong_sum_length().get(), 16);
    }

    #[test]
    fn block_length_scales_with_file_size() {
        let layout =
            calculate_signature_layout(params(10 * 1024 * 1024, None, 32, 16)).expect("layout");
        assert_eq!(layout.block_length().get(), 3_232);
        assert_eq!(layout.remainder(), 1_152);
        assert_eq!(layout.block_count(), 3_245);
        assert_eq!(layout.basis_len(), 10 * 1024 * 1024);
    }

    #[test]
    fn derived_block_lengths_are_multiples_of_eight() {
        for length in [1_000_000u64, 5_000_000, 123_456_789, 1 << 30] {
            let layout = calculate_signature_layout(params(length, None, 32, 16)).expect("layout");
            assert_eq!(layout.block_length().get() % 8, 0, "length {length}");
        }
    }

    #[test]
    fn large_files_clamp_to_the_protocol_maximum() {
        let layout = calculate_signature_layout(params(1u64 << 40, None, 32, 16)).expect("layout");
        assert_eq!(layout.block_length().get(), 128 * 1024);

        let layout = calculate_signature_layout(params(1u64 << 40, None, 29, 16)).expect("layout");
        assert_eq!(layout.block_length().get(), 8 * 1024);
    }

    #[test]
    fn forced_block_length_is_honoured() {
        let layout =
            calculate_signature_layout(params(50_000, Some(4_096), 32, 16)).expect("layout");
        assert_eq!(layout.block_length().get(), 4_096);
        assert_eq!(layout.block_count(), 13);
        assert_eq!(layout.remainder(), 848);
    }

    #[test]
    fn forced_block_length_beyond_the_cap_is_rejected() {
        let err = calculate_signature_layout(params(50_000, Some(9_000), 29, 16))
            .expect_err("out of range");
        assert!(matches!(
            err,
            SignatureLayoutError::BlockLengthOutOfRange {
                requested: 9_000,
                maximum: 8_192,
            }
        ));
    }

    #[test]
    fn checksum_length_respects_the_bias_heuristic() {
        let layout = calculate_signature_layout(params(1_048_576, None, 32, 2)).expect("layout");
        assert_eq!(layout.block_length().get(), 1_024);
        assert_eq!(layout.strong_sum_length().get(), 2);
    }

    #[test]
    fn bias_heuristic_grows_with_file_size() {
        let small = calculate_signature_layout(params(1 << 20, None, 32, 2)).expect("layout");
        let huge = calculate_signature_layout(params(1 << 42, None, 32, 2)).expect("layout");
        assert!(huge.strong_sum_length() >= small.strong_sum_length());
    }

    #[test]
    fn pre_27_layouts_pin_the_negotiated_length() {
        let layout = calculate_signature_layout(params(1 << 30, None, 26, 2)).expect("layout");
        assert_eq!(layout.strong_sum_length().get(), 2);
    }

    #[test]
    fn checksum_length_outside_digest_range_is_rejected() {
        let err = calculate_signature_layout(params(1024, None, 32, 17)).expect_err("too wide");
        assert!(matches!(
            err,
            SignatureLayoutError::ChecksumLengthOutOfRange { requested: 17, .. }
        ));

        let params_low = SignatureLayoutParams::new(
            1024,
            None,
            ProtocolVersion::NEWEST,
            ChecksumKind::Md5,
            NonZeroU8::new(1).expect("non-zero"),
        );
        assert!(calculate_signature_layout(params_low).is_err());
    }

    #[test]
    fn empty_basis_yields_zero_blocks() {
        let layout = calculate_signature_layout(params(0, None, 30, 16)).expect("layout");
        assert_eq!(layout.block_count(), 0);
        assert_eq!(layout.remainder(), 0);
        assert_eq!(layout.basis_len(), 0);
        assert_eq!(layout.block_length().get(), 700);
    }

    #[test]
    fn block_count_overflow_is_reported() {
        let err = calculate_signature_layout(params(
            (i32::MAX as u64 + 1) * u64::from(BLOCK_SIZE),
            Some(BLOCK_SIZE),
            32,
            16,
        ))
        .expect_err("overflow");
        assert!(matches!(
            err,
            SignatureLayoutError::BlockCountOverflow { .. }
        ));
    }

    #[test]
    fn file_length_overflow_is_reported() {
        let err = calculate_signature_layout(params(u64::MAX, None, 32, 16)).expect_err("overflow");
        assert!(matches!(err, SignatureLayoutError::FileTooLarge { .. }));
    }

    #[test]
    fn block_len_accounts_for_the_remainder() {
        let layout = calculate_signature_layout(params(17, Some(16), 30, 16)).expect("layout");
        assert_eq!(layout.block_count(), 2);
        assert_eq!(layout.block_len(0), 16);
        assert_eq!(layout.block_len(1), 1);
    }
}
