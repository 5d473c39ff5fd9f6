//! Copy/literal token layout (`token.c:simple_send_token`/`recv_token`).
//!
//! Every token starts with a 4-byte little-endian integer: a positive value
//! announces that many literal bytes follow verbatim, a negative value
//! `-(index + 1)` copies basis block `index`, and zero terminates the
//! stream. Runs of consecutive copies are not fused on the wire; each block
//! is its own token. Literal payloads are chunked at [`CHUNK_SIZE`] when
//! written, matching the upstream constant.

use std::io::{Read, Write};

use crate::error::WireError;
use crate::varint::{read_int, write_int};

/// Maximum literal bytes carried by a single token (upstream `CHUNK_SIZE`).
pub const CHUNK_SIZE: usize = 32 * 1024;

/// Read buffer granularity for literal payloads; bounds allocation while a
/// malformed length claim is still being verified against actual input.
const PAYLOAD_READ_STEP: usize = 64 * 1024;

/// One decoded unit of the token stream.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Token {
    /// Literal bytes to append to the reconstruction.
    Literal(Vec<u8>),
    /// Copy of the basis block with this index.
    Copy(u32),
    /// End of the token stream.
    End,
}

/// Writes literal data as one or more tokens, chunked at [`CHUNK_SIZE`].
///
/// # Errors
///
/// Propagates writer failures.
pub fn write_token_literal<W: Write + ?Sized>(writer: &mut W, data: &[u8]) -> Result<(), WireError> {
    for chunk in data.chunks(CHUNK_SIZE) {
        write_int(writer, chunk.len() as i32)?;
        writer.write_all(chunk)?;
    }
    Ok(())
}

/// Writes a copy token for the given block index.
///
/// # Errors
///
/// Returns [`WireError::Malformed`] for indices that do not fit the negated
/// `int32` encoding and propagates writer failures.
pub fn write_token_block_match<W: Write + ?Sized>(
    writer: &mut W,
    block_index: u32,
) -> Result<(), WireError> {
    let encoded = i32::try_from(block_index)
        .ok()
        .and_then(|index| index.checked_add(1))
        .map(|index| -index)
        .ok_or(WireError::Malformed("block index exceeds token range"))?;
    write_int(writer, encoded)?;
    Ok(())
}

/// Writes the end-of-stream marker (token value zero).
///
/// # Errors
///
/// Propagates writer failures.
pub fn write_token_end<W: Write + ?Sized>(writer: &mut W) -> Result<(), WireError> {
    write_int(writer, 0)?;
    Ok(())
}

/// Reads the next token, including any literal payload it announces.
///
/// Arbitrary input either decodes or fails with [`WireError::Malformed`];
/// the reader never panics.
///
/// # Errors
///
/// Returns [`WireError::Malformed`] for truncated tokens or payloads.
pub fn read_token<R: Read + ?Sized>(reader: &mut R) -> Result<Token, WireError> {
    let value = read_int(reader).map_err(WireError::from_read_error)?;
    if value == 0 {
        return Ok(Token::End);
    }
    if value > 0 {
        let payload = read_literal_payload(reader, value as usize)?;
        return Ok(Token::Literal(payload));
    }

    // value < 0: copy of block -(value + 1); value = i32::MIN still maps into
    // the u32 range through the negation below.
    let index = (-(i64::from(value) + 1)) as u32;
    Ok(Token::Copy(index))
}

/// Reads exactly `len` literal bytes announced by a token header.
///
/// The payload is consumed in bounded steps so a malformed length claim
/// fails on truncation before large allocations are committed.
///
/// # Errors
///
/// Returns [`WireError::Malformed`] when the stream ends early.
pub fn read_literal_payload<R: Read + ?Sized>(
    reader: &mut R,
    len: usize,
) -> Result<Vec<u8>, WireError> {
    let mut payload = Vec::new();
    let mut remaining = len;
    while remaining > 0 {
        let step = remaining.min(PAYLOAD_READ_STEP);
        let filled = payload.len();
        payload.resize(filled + step, 0);
        reader
            .read_exact(&mut payload[filled..])
            .map_err(WireError::from_read_error)?;
        remaining -= step;
    }
    Ok(payload)
}
