//! Signature wire codec.
//!
//! The on-wire form is the sum head (`io.c` layout) followed by one entry per
//! block: the packed weak checksum as a little-endian `u32` and the truncated
//! strong digest as raw bytes, with no padding. The layout is byte-compatible
//! with the agreed protocol version across the supported range, so persisted
//! signatures interoperate as long as they use this codec unchanged.

use std::io::{Read, Write};

use core::num::{NonZeroU32, NonZeroU8};

use thiserror::Error;

use protocol::wire::{read_sum_head, write_sum_head, SumHead};
use protocol::{SessionContext, WireError};

use crate::block::SignatureBlock;
use crate::file::FileSignature;
use crate::layout::{SignatureLayout, BLOCK_SIZE};

/// Errors produced while encoding or decoding signatures.
#[derive(Debug, Error)]
pub enum SignatureWireError {
    /// Structural wire failure: truncation or an inconsistent header.
    #[error(transparent)]
    Wire(#[from] WireError),
    /// The decoded data contradicts itself semantically.
    #[error("invalid signature: {0}")]
    Invalid(&'static str),
}

/// Writes a signature in the layout of the agreed protocol version.
///
/// # Errors
///
/// Returns [`SignatureWireError::Invalid`] when the signature is internally
/// inconsistent and [`SignatureWireError::Wire`] for representation or
/// writer failures.
pub fn write_signature<W: Write + ?Sized>(
    writer: &mut W,
    signature: &FileSignature,
    ctx: &SessionContext,
) -> Result<(), SignatureWireError> {
    if !signature.is_consistent() {
        return Err(SignatureWireError::Invalid(
            "entry count or strong-sum width contradicts the layout",
        ));
    }

    let layout = signature.layout();
    let count = u32::try_from(layout.block_count())
        .map_err(|_| SignatureWireError::Invalid("block count exceeds the wire range"))?;

    let head = SumHead {
        count,
        block_length: layout.block_length().get(),
        s2_length: u32::from(layout.strong_sum_length().get()),
        remainder: layout.remainder(),
    };
    write_sum_head(writer, &head, ctx.protocol())?;

    for block in signature.blocks() {
        writer
            .write_all(&block.weak().to_le_bytes())
            .map_err(WireError::Io)?;
        writer.write_all(block.strong()).map_err(WireError::Io)?;
    }
    Ok(())
}

/// Reads a signature in the layout of the agreed protocol version.
///
/// Arbitrary input either decodes or fails with a typed error; the reader
/// never panics. The session context supplies the digest kind the entries
/// were computed with, since the wire carries no algorithm tag.
///
/// # Errors
///
/// Returns [`SignatureWireError::Wire`] for truncated or structurally
/// malformed input and [`SignatureWireError::Invalid`] when the header
/// contradicts the session parameters.
pub fn read_signature<R: Read + ?Sized>(
    reader: &mut R,
    ctx: &SessionContext,
) -> Result<FileSignature, SignatureWireError> {
    let head = read_sum_head(reader, ctx.protocol())?;
    let layout = layout_from_head(&head, ctx)?;

    let strong_len = usize::from(layout.strong_sum_length().get());
    // No up-front allocation from the announced count; truncation surfaces first.
    let mut blocks = Vec::new();
    for _ in 0..head.count {
        let mut weak = [0u8; 4];
        reader
            .read_exact(&mut weak)
            .map_err(WireError::from_read_error)?;

        let mut strong = vec![0u8; strong_len];
        reader
            .read_exact(&mut strong)
            .map_err(WireError::from_read_error)?;

        blocks.push(SignatureBlock::new(u32::from_le_bytes(weak), strong));
    }

    Ok(FileSignature::new(ctx.checksum(), layout, blocks))
}

/// Encodes a signature into a fresh buffer.
///
/// # Errors
///
/// Same conditions as [`write_signature`].
pub fn encode_signature(
    signature: &FileSignature,
    ctx: &SessionContext,
) -> Result<Vec<u8>, SignatureWireError> {
    let mut buf = Vec::new();
    write_signature(&mut buf, signature, ctx)?;
    Ok(buf)
}

/// Decodes a signature from a buffer, requiring the buffer to hold exactly
/// one signature.
///
/// # Errors
///
/// Same conditions as [`read_signature`], plus
/// [`SignatureWireError::Invalid`] for trailing bytes.
pub fn decode_signature(
    bytes: &[u8],
    ctx: &SessionContext,
) -> Result<FileSignature, SignatureWireError> {
    let mut cursor = bytes;
    let signature = read_signature(&mut cursor, ctx)?;
    if !cursor.is_empty() {
        return Err(SignatureWireError::Invalid("trailing data after signature"));
    }
    Ok(signature)
}

fn layout_from_head(
    head: &SumHead,
    ctx: &SessionContext,
) -> Result<SignatureLayout, SignatureWireError> {
    let digest_len = ctx.checksum().digest_len();
    if head.count > 0 {
        if head.s2_length < 2 {
            return Err(SignatureWireError::Invalid("strong-sum length below minimum"));
        }
        if head.s2_length as usize > digest_len {
            return Err(SignatureWireError::Invalid(
                "strong-sum length exceeds the session digest width",
            ));
        }
    }

    // An empty signature may legitimately announce a zero block length; the
    // substitute keeps the layout type's invariant without changing meaning.
    let block_length = NonZeroU32::new(head.block_length)
        .unwrap_or(NonZeroU32::new(BLOCK_SIZE).expect("non-zero"));
    let strong_sum_length = NonZeroU8::new(head.s2_length.min(255) as u8)
        .unwrap_or(NonZeroU8::new(2).expect("non-zero"));

    Ok(SignatureLayout::from_raw_parts(
        block_length,
        head.remainder,
        u64::from(head.count),
        strong_sum_length,
    ))
}
