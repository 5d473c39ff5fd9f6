//! Streaming delta generation.
//!
//! The generator reproduces the scan loop of `match.c`: a rolling checksum
//! slides over the target one byte at a time, the hash index is probed at
//! every offset, weak hits are confirmed against the strong digest, and the
//! `want_i` adjacency preference keeps runs of consecutive blocks together.
//! A false alarm never advances the window by more than one byte. Target
//! bytes arrive in chunks; instructions are emitted as soon as they are
//! decided so callers can interleave matching with I/O.

#[cfg(feature = "tracing")]
use tracing::instrument;

use checksums::{RollingChecksum, RollingDigest};
use protocol::wire::CHUNK_SIZE;
use protocol::SessionContext;
use signature::SignatureAlgorithm;

use crate::error::MatchError;
use crate::index::SignatureIndex;
use crate::script::{DeltaScript, DeltaStats, DeltaToken};

/// Incremental matcher over a target byte stream.
///
/// Feed target bytes with [`feed`](Self::feed); every committed instruction
/// is appended to the caller's token vector immediately. [`finish`](Self::finish)
/// probes the trailing windows (including the short last block when the
/// basis has a remainder), flushes the final literal, and returns the pass
/// statistics. The internal buffer holds at most one window plus one
/// unflushed literal chunk beyond the bytes of the current `feed` call.
pub struct DeltaGenerator<'a> {
    index: &'a SignatureIndex,
    algorithm: SignatureAlgorithm,
    weak_seed: u32,
    block_seed: u32,
    buf: Vec<u8>,
    pos: usize,
    weak: RollingChecksum,
    window_ready: bool,
    probed: bool,
    want_i: u32,
    stats: DeltaStats,
}

impl<'a> DeltaGenerator<'a> {
    /// Creates a generator for one matching pass.
    #[must_use]
    pub fn new(index: &'a SignatureIndex, ctx: &SessionContext) -> Self {
        Self {
            index,
            algorithm: SignatureAlgorithm::for_session(ctx),
            weak_seed: ctx.weak_seed(),
            block_seed: ctx.block_seed(),
            buf: Vec::new(),
            pos: 0,
            weak: RollingChecksum::new(),
            window_ready: false,
            probed: false,
            want_i: 0,
            stats: DeltaStats::default(),
        }
    }

    /// Returns the statistics accumulated so far.
    #[must_use]
    pub const fn stats(&self) -> DeltaStats {
        self.stats
    }

    /// Feeds the next chunk of target bytes, appending decided instructions
    /// to `out`.
    ///
    /// # Errors
    ///
    /// Propagates rolling-checksum window errors, which indicate a
    /// corrupted internal state rather than bad input.
    pub fn feed(&mut self, chunk: &[u8], out: &mut Vec<DeltaToken>) -> Result<(), MatchError> {
        self.buf.extend_from_slice(chunk);
        self.scan(out)?;
        // Everything behind the window start is committed literal; stream it
        // out so the buffer stays bounded.
        let committed = self.pos;
        self.spill_to(committed, out);
        Ok(())
    }

    /// Completes the pass: probes the tail windows, flushes the trailing
    /// literal, and returns the statistics.
    ///
    /// # Errors
    ///
    /// Propagates rolling-checksum window errors, as in [`feed`](Self::feed).
    pub fn finish(mut self, out: &mut Vec<DeltaToken>) -> Result<DeltaStats, MatchError> {
        self.scan(out)?;
        self.probe_short_tail(out);

        let rest = self.buf.len();
        self.spill_to(rest, out);
        Ok(self.stats)
    }

    fn scan(&mut self, out: &mut Vec<DeltaToken>) -> Result<(), MatchError> {
        if self.index.block_count() == 0 {
            return Ok(());
        }
        let block_len = self.index.block_length() as usize;

        loop {
            let avail = self.buf.len();
            if self.pos + block_len > avail {
                break;
            }

            if !self.window_ready {
                self.weak
                    .update_from_block(&self.buf[self.pos..self.pos + block_len]);
                self.window_ready = true;
                self.probed = false;
            }

            if !self.probed {
                self.probed = true;
                let weak = self.weak.value_with_seed(self.weak_seed);
                let window = &self.buf[self.pos..self.pos + block_len];
                if let Some(hit) = self.index.search(
                    weak,
                    window,
                    self.algorithm,
                    self.block_seed,
                    self.want_i,
                    &mut self.stats,
                ) {
                    let committed = self.pos;
                    self.spill_to(committed, out);
                    self.emit_copy(hit, block_len as u64, out);
                    self.buf.drain(..block_len);
                    self.window_ready = false;
                    continue;
                }
            }

            // Miss: slide one byte if the incoming byte is available.
            if self.pos + block_len == avail {
                break;
            }
            let outgoing = self.buf[self.pos];
            let incoming = self.buf[self.pos + block_len];
            self.weak.roll(outgoing, incoming)?;
            self.pos += 1;
            self.probed = false;

            if self.pos >= CHUNK_SIZE {
                let committed = self.pos;
                self.spill_to(committed, out);
            }
        }

        Ok(())
    }

    /// Probes the single position where a remainder-length window lines up
    /// with the end of the target; only the short last block can match there.
    fn probe_short_tail(&mut self, out: &mut Vec<DeltaToken>) {
        let remainder = self.index.layout().remainder() as usize;
        if self.index.block_count() == 0 || remainder == 0 {
            return;
        }

        let avail = self.buf.len();
        if avail < remainder {
            return;
        }
        let tail_start = avail - remainder;
        if tail_start < self.pos {
            return;
        }

        let window = &self.buf[tail_start..];
        let weak = RollingDigest::from_bytes(window).value_with_seed(self.weak_seed);
        if let Some(hit) = self.index.search(
            weak,
            window,
            self.algorithm,
            self.block_seed,
            self.want_i,
            &mut self.stats,
        ) {
            self.spill_to(tail_start, out);
            self.emit_copy(hit, remainder as u64, out);
            self.buf.clear();
            self.pos = 0;
            self.window_ready = false;
        }
    }

    /// Moves `buf[..upto]` into the output as literal bytes.
    fn spill_to(&mut self, upto: usize, out: &mut Vec<DeltaToken>) {
        if upto == 0 {
            return;
        }
        self.stats.literal_bytes += upto as u64;
        self.stats.total_bytes += upto as u64;
        if let Some(DeltaToken::Literal(last)) = out.last_mut() {
            last.extend_from_slice(&self.buf[..upto]);
        } else {
            out.push(DeltaToken::Literal(self.buf[..upto].to_vec()));
        }
        self.buf.drain(..upto);
        self.pos = self.pos.saturating_sub(upto);
    }

    fn emit_copy(&mut self, index: u32, len: u64, out: &mut Vec<DeltaToken>) {
        self.stats.matched_bytes += len;
        self.stats.total_bytes += len;
        self.want_i = index + 1;

        if let Some(DeltaToken::Copy {
            index: run_start,
            run,
        }) = out.last_mut()
        {
            if *run_start + *run == index {
                *run += 1;
                return;
            }
        }
        out.push(DeltaToken::Copy { index, run: 1 });
    }
}

/// Generates the delta for an in-memory target in one call.
///
/// # Errors
///
/// Propagates [`MatchError`] values from the streaming generator.
#[cfg_attr(
    feature = "tracing",
    instrument(skip(index, ctx, target), fields(target_len = target.len()), name = "generate_delta")
)]
pub fn generate_delta(
    index: &SignatureIndex,
    target: &[u8],
    ctx: &SessionContext,
) -> Result<DeltaScript, MatchError> {
    let mut generator = DeltaGenerator::new(index, ctx);
    let mut tokens = Vec::new();
    generator.feed(target, &mut tokens)?;
    let stats = generator.finish(&mut tokens)?;
    Ok(DeltaScript::new(tokens, stats.total_bytes, stats.literal_bytes))
}
