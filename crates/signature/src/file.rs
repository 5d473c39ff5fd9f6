//! Owning signature type for a complete basis.

use protocol::ChecksumKind;

use crate::block::SignatureBlock;
use crate::layout::SignatureLayout;

/// Complete signature of a basis: the layout plus one fingerprint entry per
/// block, in block order. An empty basis has a zero block count and no
/// entries.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileSignature {
    checksum: ChecksumKind,
    layout: SignatureLayout,
    blocks: Vec<SignatureBlock>,
}

impl FileSignature {
    /// Creates a signature from its parts.
    #[must_use]
    pub const fn new(
        checksum: ChecksumKind,
        layout: SignatureLayout,
        blocks: Vec<SignatureBlock>,
    ) -> Self {
        Self {
            checksum,
            layout,
            blocks,
        }
    }

    /// Returns the strong checksum kind the fingerprints were computed with.
    #[must_use]
    pub const fn checksum(&self) -> ChecksumKind {
        self.checksum
    }

    /// Returns the block layout.
    #[must_use]
    pub const fn layout(&self) -> SignatureLayout {
        self.layout
    }

    /// Returns the per-block entries in block order.
    #[must_use]
    pub fn blocks(&self) -> &[SignatureBlock] {
        &self.blocks
    }

    /// Returns `true` when the signature describes an empty basis.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Checks the entries against the layout.
    ///
    /// A consistent signature has exactly `block_count` entries whose strong
    /// digests are all `strong_sum_length` bytes wide. Receivers run this
    /// before indexing so a header that contradicts its entries is rejected
    /// up front.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        if self.blocks.len() as u64 != self.layout.block_count() {
            return false;
        }
        let strong_len = usize::from(self.layout.strong_sum_length().get());
        self.blocks.iter().all(|block| block.strong().len() == strong_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::num::{NonZeroU32, NonZeroU8};

    fn layout(count: u64, block_length: u32, remainder: u32, strong: u8) -> SignatureLayout {
        SignatureLayout::from_raw_parts(
            NonZeroU32::new(block_length).expect("non-zero"),
            remainder,
            count,
            NonZeroU8::new(strong).expect("non-zero"),
        )
    }

    #[test]
    fn consistency_requires_matching_counts() {
        let signature = FileSignature::new(
            ChecksumKind::Md5,
            layout(2, 16, 0, 4),
            vec![
                SignatureBlock::new(1, vec![0; 4]),
                SignatureBlock::new(2, vec![0; 4]),
            ],
        );
        assert!(signature.is_consistent());

        let short = FileSignature::new(
            ChecksumKind::Md5,
            layout(2, 16, 0, 4),
            vec![SignatureBlock::new(1, vec![0; 4])],
        );
        assert!(!short.is_consistent());
    }

    #[test]
    fn consistency_requires_uniform_strong_widths() {
        let signature = FileSignature::new(
            ChecksumKind::Md5,
            layout(1, 16, 0, 4),
            vec![SignatureBlock::new(1, vec![0; 3])],
        );
        assert!(!signature.is_consistent());
    }

    #[test]
    fn empty_signature_is_consistent() {
        let signature = FileSignature::new(ChecksumKind::Md4, layout(0, 700, 0, 2), Vec::new());
        assert!(signature.is_empty());
        assert!(signature.is_consistent());
    }
}
