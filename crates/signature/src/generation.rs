//! Signature generation from basis bytes.

use std::io::{self, Read};

use thiserror::Error;
#[cfg(feature = "tracing")]
use tracing::instrument;

use checksums::RollingDigest;
use protocol::SessionContext;

use crate::algorithm::SignatureAlgorithm;
use crate::block::SignatureBlock;
use crate::file::FileSignature;
use crate::layout::SignatureLayout;

/// Errors returned when generating file signatures.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// Underlying I/O failure raised while reading basis bytes.
    #[error("failed to read input while generating signature: {0}")]
    Io(
        #[from]
        #[source]
        io::Error,
    ),
    /// The layout requests a strong-sum width the session digest cannot fill.
    #[error("layout requests {requested} strong-sum bytes but the digest produces {available}")]
    DigestTooNarrow {
        /// Bytes requested by the layout.
        requested: usize,
        /// Full width of the session digest.
        available: usize,
    },
    /// Extra bytes were present after consuming the advertised layout.
    #[error("input contained trailing data beyond the expected layout")]
    TrailingData,
    /// The layout describes more blocks than this platform can address.
    #[error("signature layout describes {0} blocks which exceeds addressable memory")]
    TooManyBlocks(u64),
}

/// Generates a signature for the basis supplied by `reader`.
///
/// The reader must yield exactly the number of bytes the layout describes.
/// Each block is fingerprinted with the weak rolling checksum (seed-folded
/// per the session protocol) and the session's strong digest truncated to
/// the layout width.
///
/// # Errors
///
/// - [`SignatureError::DigestTooNarrow`] when the layout and session digest
///   disagree on the available strong-sum width.
/// - [`SignatureError::TooManyBlocks`] when the block count does not fit the
///   platform's address space.
/// - [`SignatureError::TrailingData`] when the reader yields bytes past the
///   layout.
/// - Any I/O error surfaced by the reader.
#[cfg_attr(
    feature = "tracing",
    instrument(skip(reader, ctx), fields(blocks = layout.block_count()), name = "generate_signature")
)]
pub fn generate_file_signature<R: Read>(
    mut reader: R,
    layout: SignatureLayout,
    ctx: &SessionContext,
) -> Result<FileSignature, SignatureError> {
    let algorithm = SignatureAlgorithm::for_session(ctx);
    let strong_len = usize::from(layout.strong_sum_length().get());
    if strong_len > algorithm.digest_len() {
        return Err(SignatureError::DigestTooNarrow {
            requested: strong_len,
            available: algorithm.digest_len(),
        });
    }

    let block_len = layout.block_length().get() as usize;
    let expected_blocks = usize::try_from(layout.block_count())
        .map_err(|_| SignatureError::TooManyBlocks(layout.block_count()))?;

    let mut blocks = Vec::with_capacity(expected_blocks);
    let mut buffer = vec![0u8; block_len.max(1)];

    for index in 0..expected_blocks {
        let target_len = layout.block_len(index as u64) as usize;
        let chunk = &mut buffer[..target_len];
        reader.read_exact(chunk)?;

        let weak = RollingDigest::from_bytes(chunk).value_with_seed(ctx.weak_seed());
        let strong = algorithm.block_digest(chunk, ctx.block_seed(), strong_len);
        blocks.push(SignatureBlock::new(weak, strong));
    }

    let mut extra = [0u8; 1];
    if reader.read(&mut extra)? != 0 {
        return Err(SignatureError::TrailingData);
    }

    Ok(FileSignature::new(ctx.checksum(), layout, blocks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{calculate_signature_layout, SignatureLayoutParams};
    use core::num::{NonZeroU32, NonZeroU8};
    use protocol::{ChecksumKind, ProtocolVersion};
    use std::io::Cursor;

    fn ctx(version: u8) -> SessionContext {
        SessionContext::new(ProtocolVersion::new(version).expect("supported"))
    }

    fn forced_layout(len: u64, block: u32, ctx: &SessionContext) -> SignatureLayout {
        let params = SignatureLayoutParams::new(
            len,
            NonZeroU32::new(block),
            ctx.protocol(),
            ctx.checksum(),
            NonZeroU8::new(16).expect("non-zero"),
        );
        calculate_signature_layout(params).expect("layout")
    }

    #[test]
    fn fingerprints_every_block() {
        let ctx = ctx(30);
        let data = vec![0xabu8; 64];
        let layout = forced_layout(64, 16, &ctx);

        let signature =
            generate_file_signature(Cursor::new(&data), layout, &ctx).expect("signature");
        assert_eq!(signature.blocks().len(), 4);
        assert!(signature.is_consistent());

        // Identical blocks fingerprint identically.
        let first = &signature.blocks()[0];
        assert!(signature
            .blocks()
            .iter()
            .all(|block| block.weak() == first.weak() && block.strong() == first.strong()));
    }

    #[test]
    fn short_tail_uses_the_remainder_length() {
        let ctx = ctx(30);
        let data = vec![b'a'; 17];
        let layout = forced_layout(17, 16, &ctx);

        let signature =
            generate_file_signature(Cursor::new(&data), layout, &ctx).expect("signature");
        assert_eq!(signature.blocks().len(), 2);

        let tail_weak = RollingDigest::from_bytes(&data[16..]).value();
        assert_eq!(signature.blocks()[1].weak(), tail_weak);
    }

    #[test]
    fn empty_basis_yields_no_blocks() {
        let ctx = ctx(30);
        let layout = forced_layout(0, 700, &ctx);
        let signature =
            generate_file_signature(Cursor::new(&[] as &[u8]), layout, &ctx).expect("signature");
        assert!(signature.is_empty());
        assert!(signature.is_consistent());
    }

    #[test]
    fn trailing_data_is_rejected() {
        let ctx = ctx(30);
        let layout = forced_layout(16, 16, &ctx);
        let err = generate_file_signature(Cursor::new(vec![0u8; 17]), layout, &ctx)
            .expect_err("trailing");
        assert!(matches!(err, SignatureError::TrailingData));
    }

    #[test]
    fn truncated_input_propagates_io_error() {
        let ctx = ctx(30);
        let layout = forced_layout(32, 16, &ctx);
        let err =
            generate_file_signature(Cursor::new(vec![0u8; 20]), layout, &ctx).expect_err("short");
        assert!(matches!(err, SignatureError::Io(_)));
    }

    #[test]
    fn weak_seed_changes_fingerprints_on_modern_protocols() {
        let data = vec![0x55u8; 32];
        let base = ctx(30);
        let seeded = ctx(30).with_checksum_seed(7);

        let layout = forced_layout(32, 16, &base);
        let plain = generate_file_signature(Cursor::new(&data), layout, &base).expect("signature");
        let mixed =
            generate_file_signature(Cursor::new(&data), layout, &seeded).expect("signature");

        assert_ne!(plain.blocks()[0].weak(), mixed.blocks()[0].weak());
        assert_ne!(plain.blocks()[0].strong(), mixed.blocks()[0].strong());
    }

    #[test]
    fn weak_checksum_is_unseeded_below_protocol_27() {
        let data = vec![0x55u8; 32];
        let base = ctx(26);
        let seeded = ctx(26).with_checksum_seed(7);

        let layout = forced_layout(32, 16, &base);
        let plain = generate_file_signature(Cursor::new(&data), layout, &base).expect("signature");
        let mixed =
            generate_file_signature(Cursor::new(&data), layout, &seeded).expect("signature");

        assert_eq!(plain.blocks()[0].weak(), mixed.blocks()[0].weak());
        assert_ne!(plain.blocks()[0].strong(), mixed.blocks()[0].strong());
    }

    #[test]
    fn md4_and_md5_sessions_disagree_on_strong_sums() {
        let data = vec![0x11u8; 16];
        let md4_ctx = ctx(29);
        let md5_ctx = ctx(30);
        assert_eq!(md4_ctx.checksum(), ChecksumKind::Md4);
        assert_eq!(md5_ctx.checksum(), ChecksumKind::Md5);

        let layout = forced_layout(16, 16, &md4_ctx);
        let md4_sig =
            generate_file_signature(Cursor::new(&data), layout, &md4_ctx).expect("signature");
        let md5_sig =
            generate_file_signature(Cursor::new(&data), layout, &md5_ctx).expect("signature");

        assert_ne!(md4_sig.blocks()[0].strong(), md5_sig.blocks()[0].strong());
    }
}
