//! Delta wire stream.
//!
//! A delta travels as the `token.c` stream: literal runs and per-block copy
//! tokens, terminated by a zero token. In-memory copy runs are expanded one
//! token per block on the way out and re-fused on the way in, so
//! `decode_delta(encode_delta(script))` is the identity. When the session
//! negotiates compression, the encoded stream flows through the codec as a
//! single framed unit; multiplexed framing is the session layer's concern.

use protocol::wire::{
    read_token, write_token_block_match, write_token_end, write_token_literal, Token,
};
use protocol::{SessionContext, WireError};
use signature::SignatureLayout;

use crate::script::{DeltaScript, DeltaToken};

/// Encodes a delta script into its wire form.
///
/// # Errors
///
/// Returns [`WireError`] for unencodable block indices or compression
/// failures.
pub fn encode_delta(script: &DeltaScript, ctx: &SessionContext) -> Result<Vec<u8>, WireError> {
    let mut raw = Vec::new();
    for token in script.tokens() {
        match token {
            DeltaToken::Literal(bytes) => write_token_literal(&mut raw, bytes)?,
            DeltaToken::Copy { index, run } => {
                for offset in 0..*run {
                    write_token_block_match(&mut raw, index + offset)?;
                }
            }
        }
    }
    write_token_end(&mut raw)?;

    match ctx.compression() {
        None => Ok(raw),
        Some(algorithm) => Ok(algorithm.compress(&raw)?),
    }
}

/// Decodes a delta script from its wire form.
///
/// The buffer must hold exactly one token stream. Adjacent literals merge
/// and consecutive copy tokens fuse into runs, restoring the canonical
/// in-memory form the matcher produces.
///
/// # Errors
///
/// Returns [`WireError::Malformed`] for truncated streams, corrupt
/// compressed payloads, copy tokens referencing blocks the layout does not
/// have, or trailing bytes after the end token.
pub fn decode_delta(
    bytes: &[u8],
    layout: &SignatureLayout,
    ctx: &SessionContext,
) -> Result<DeltaScript, WireError> {
    let decompressed;
    let mut cursor: &[u8] = match ctx.compression() {
        None => bytes,
        Some(algorithm) => {
            decompressed = algorithm
                .decompress(bytes)
                .map_err(|_| WireError::Malformed("corrupt compressed token stream"))?;
            &decompressed
        }
    };

    let mut tokens: Vec<DeltaToken> = Vec::new();
    loop {
        match read_token(&mut cursor)? {
            Token::End => break,
            Token::Literal(bytes) => {
                if let Some(DeltaToken::Literal(last)) = tokens.last_mut() {
                    last.extend_from_slice(&bytes);
                } else {
                    tokens.push(DeltaToken::Literal(bytes));
                }
            }
            Token::Copy(index) => {
                if u64::from(index) >= layout.block_count() {
                    return Err(WireError::Malformed(
                        "copy token references a block past the signature",
                    ));
                }
                if let Some(DeltaToken::Copy {
                    index: run_start,
                    run,
                }) = tokens.last_mut()
                {
                    if *run_start + *run == index {
                        *run += 1;
                        continue;
                    }
                }
                tokens.push(DeltaToken::Copy { index, run: 1 });
            }
        }
    }

    if !cursor.is_empty() {
        return Err(WireError::Malformed("trailing data after the end token"));
    }

    Ok(DeltaScript::from_tokens(tokens, layout))
}
