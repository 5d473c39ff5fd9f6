//! Delta application.

use std::io::Write;

#[cfg(feature = "tracing")]
use tracing::instrument;

use protocol::SessionContext;
use signature::{SignatureAlgorithm, SignatureLayout};

use crate::error::ApplyError;
use crate::script::{DeltaScript, DeltaToken};

/// Applies a delta to the basis, writing the reconstructed target to `out`.
///
/// Instructions are consumed in order; copies resolve against the basis via
/// the layout's block geometry. Returns the number of bytes written.
///
/// # Errors
///
/// - [`ApplyError::DeltaInvalid`] when a copy references blocks the layout
///   does not have or the basis is shorter than the layout describes.
/// - [`ApplyError::Io`] for output failures.
#[cfg_attr(
    feature = "tracing",
    instrument(skip(basis, script, layout, out), fields(tokens = script.tokens().len()), name = "apply_delta")
)]
pub fn apply_delta<W: Write + ?Sized>(
    basis: &[u8],
    script: &DeltaScript,
    layout: &SignatureLayout,
    out: &mut W,
) -> Result<u64, ApplyError> {
    let mut written = 0u64;
    for token in script.tokens() {
        match token {
            DeltaToken::Literal(bytes) => {
                out.write_all(bytes)?;
                written += bytes.len() as u64;
            }
            DeltaToken::Copy { index, run } => {
                let range = copy_range(*index, *run, layout, basis.len())?;
                let bytes = &basis[range.0..range.1];
                out.write_all(bytes)?;
                written += bytes.len() as u64;
            }
        }
    }
    Ok(written)
}

/// Applies a delta and verifies the reconstruction against a whole-file
/// digest.
///
/// The digest is computed with the session checksum, seeded per the agreed
/// protocol version (unseeded below protocol 30).
///
/// # Errors
///
/// Same conditions as [`apply_delta`], plus [`ApplyError::IntegrityFailure`]
/// when the reconstructed bytes do not hash to `expected_digest`.
pub fn apply_delta_verified<W: Write + ?Sized>(
    basis: &[u8],
    script: &DeltaScript,
    layout: &SignatureLayout,
    ctx: &SessionContext,
    expected_digest: &[u8],
    out: &mut W,
) -> Result<u64, ApplyError> {
    let algorithm = SignatureAlgorithm::for_session(ctx);
    let mut hasher = algorithm.file_hasher(ctx.whole_file_seed());

    let mut tee = TeeWriter {
        inner: out,
        hasher: &mut hasher,
    };
    let written = apply_delta(basis, script, layout, &mut tee)?;

    if hasher.finalize() != expected_digest {
        return Err(ApplyError::IntegrityFailure);
    }
    Ok(written)
}

fn copy_range(
    index: u32,
    run: u32,
    layout: &SignatureLayout,
    basis_len: usize,
) -> Result<(usize, usize), ApplyError> {
    if run == 0 {
        return Err(ApplyError::DeltaInvalid("copy with a zero-length run"));
    }
    let first = u64::from(index);
    let last = first + u64::from(run) - 1;
    if last >= layout.block_count() {
        return Err(ApplyError::DeltaInvalid(
            "copy references a block past the basis end",
        ));
    }

    let block_length = u64::from(layout.block_length().get());
    let start = first * block_length;
    let len = u64::from(run - 1) * block_length + u64::from(layout.block_len(last));
    let end = start + len;
    if end > basis_len as u64 {
        return Err(ApplyError::DeltaInvalid(
            "basis is shorter than the signature layout describes",
        ));
    }

    Ok((start as usize, end as usize))
}

struct TeeWriter<'a, W: Write + ?Sized> {
    inner: &'a mut W,
    hasher: &'a mut signature::StrongHasher,
}

impl<W: Write + ?Sized> Write for TeeWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.hasher.update(&buf[..written]);
        Ok(written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
