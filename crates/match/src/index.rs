//! Flat hash index over a signature.
//!
//! The structure mirrors `match.c:build_hash_table`: a power-of-two head
//! table and a parallel chain array indexed by block number, with no
//! per-node allocation. Blocks are inserted in descending index order so a
//! chain walk visits candidates in ascending block order; the matcher's
//! tie-break (first confirmed hit wins) therefore selects the lowest block
//! index sharing a fingerprint.

use protocol::SessionContext;
use signature::{FileSignature, SignatureAlgorithm, SignatureLayout};

use crate::error::MatchError;
use crate::script::DeltaStats;

/// Chain terminator in the head and chain tables.
const EMPTY: i32 = -1;

/// Smallest head table allocated, keeping tiny signatures cheap to probe.
const MIN_TABLE_SIZE: usize = 16;

/// Ephemeral lookup from weak checksum to candidate block indices.
///
/// Built by the receiver when a signature arrives and dropped when the
/// matching pass ends.
#[derive(Clone, Debug)]
pub struct SignatureIndex {
    layout: SignatureLayout,
    weaks: Vec<u32>,
    strongs: Vec<u8>,
    strong_len: usize,
    heads: Vec<i32>,
    chain: Vec<i32>,
    mask: u32,
}

impl SignatureIndex {
    /// Builds the index for a signature.
    ///
    /// # Errors
    ///
    /// - [`MatchError::SignatureInvalid`] when the signature's entries
    ///   contradict its header.
    /// - [`MatchError::ResourceLimit`] when the tables would exceed the
    ///   session memory cap.
    pub fn build(signature: &FileSignature, ctx: &SessionContext) -> Result<Self, MatchError> {
        if !signature.is_consistent() {
            return Err(MatchError::SignatureInvalid(
                "entry count or strong-sum width contradicts the header",
            ));
        }

        let layout = signature.layout();
        let count = signature.blocks().len();
        let strong_len = usize::from(layout.strong_sum_length().get());

        let table_size = table_size_for(count);
        if let Some(limit) = ctx.memory_limit() {
            let needed = estimated_bytes(count, table_size, strong_len);
            if needed > limit {
                return Err(MatchError::ResourceLimit { needed, limit });
            }
        }

        let mut weaks = Vec::with_capacity(count);
        let mut strongs = Vec::with_capacity(count * strong_len);
        for block in signature.blocks() {
            weaks.push(block.weak());
            strongs.extend_from_slice(block.strong());
        }

        let mask = (table_size - 1) as u32;
        let mut heads = vec![EMPTY; table_size];
        let mut chain = vec![EMPTY; count];
        for index in (0..count).rev() {
            let slot = (hash32(weaks[index]) & mask) as usize;
            chain[index] = heads[slot];
            heads[slot] = index as i32;
        }

        Ok(Self {
            layout,
            weaks,
            strongs,
            strong_len,
            heads,
            chain,
            mask,
        })
    }

    /// Returns the indexed layout.
    #[must_use]
    pub const fn layout(&self) -> SignatureLayout {
        self.layout
    }

    /// Returns the number of indexed blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.weaks.len()
    }

    /// Returns the nominal block length in bytes.
    #[must_use]
    pub const fn block_length(&self) -> u32 {
        self.layout.block_length().get()
    }

    /// Returns the length of block `index` in bytes.
    #[must_use]
    pub fn block_len_of(&self, index: u32) -> u32 {
        self.layout.block_len(u64::from(index))
    }

    fn strong_of(&self, index: usize) -> &[u8] {
        let start = index * self.strong_len;
        &self.strongs[start..start + self.strong_len]
    }

    /// Probes the index for a block matching the window.
    ///
    /// Walks the chain for the weak checksum's slot, confirming candidates
    /// against the strong digest of `window` (computed lazily, at most once
    /// per probe). On a confirmed hit the adjacent-block preference is
    /// applied: when `want_i` also matches, it is chosen over the chain
    /// candidate. Failed strong confirmations count as false alarms.
    pub(crate) fn search(
        &self,
        weak: u32,
        window: &[u8],
        algorithm: SignatureAlgorithm,
        block_seed: u32,
        want_i: u32,
        stats: &mut DeltaStats,
    ) -> Option<u32> {
        if self.weaks.is_empty() {
            return None;
        }

        let slot = (hash32(weak) & self.mask) as usize;
        let mut cursor = self.heads[slot];
        let mut window_strong: Option<Vec<u8>> = None;

        while cursor != EMPTY {
            let candidate = cursor as usize;
            cursor = self.chain[candidate];

            if self.weaks[candidate] != weak {
                continue;
            }
            if self.block_len_of(candidate as u32) as usize != window.len() {
                continue;
            }

            let strong = window_strong.get_or_insert_with(|| {
                algorithm.block_digest(window, block_seed, self.strong_len)
            });
            if strong.as_slice() != self.strong_of(candidate) {
                stats.false_alarms += 1;
                continue;
            }

            let mut chosen = candidate as u32;
            let want = want_i as usize;
            if chosen != want_i
                && want < self.weaks.len()
                && self.weaks[want] == weak
                && self.block_len_of(want_i) as usize == window.len()
                && strong.as_slice() == self.strong_of(want)
            {
                chosen = want_i;
            }

            stats.hash_hits += 1;
            return Some(chosen);
        }

        None
    }
}

/// Golden-ratio scramble spreading the weak checksum across the table.
#[inline]
fn hash32(weak: u32) -> u32 {
    let mixed = weak.wrapping_mul(0x9E37_79B9);
    mixed ^ (mixed >> 16)
}

/// Smallest power of two at or above 1.25 times the block count.
fn table_size_for(count: usize) -> usize {
    let target = count + count.div_ceil(4);
    target.next_power_of_two().max(MIN_TABLE_SIZE)
}

fn estimated_bytes(count: usize, table_size: usize, strong_len: usize) -> u64 {
    let tables = (table_size + count) * core::mem::size_of::<i32>();
    let fingerprints = count * (core::mem::size_of::<u32>() + strong_len);
    (tables + fingerprints) as u64
}
