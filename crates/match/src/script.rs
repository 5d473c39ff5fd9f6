//! Delta script representation.

use signature::SignatureLayout;

/// One instruction of a delta.
///
/// Runs of consecutive block copies are fused in memory (`run` counts
/// blocks); the wire codec re-expands them into one token per block, which
/// keeps peers' run-length accounting intact.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DeltaToken {
    /// Literal bytes to append to the reconstruction.
    Literal(Vec<u8>),
    /// Copy of `run` consecutive basis blocks starting at `index`.
    Copy {
        /// Zero-based index of the first copied block.
        index: u32,
        /// Number of consecutive blocks copied.
        run: u32,
    },
}

impl DeltaToken {
    /// Returns `true` when the token is a literal payload.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self, DeltaToken::Literal(_))
    }

    /// Returns the number of bytes the token contributes under `layout`.
    #[must_use]
    pub fn byte_len(&self, layout: &SignatureLayout) -> u64 {
        match self {
            DeltaToken::Literal(bytes) => bytes.len() as u64,
            DeltaToken::Copy { index, run } => {
                if *run == 0 {
                    return 0;
                }
                let last = u64::from(*index) + u64::from(*run) - 1;
                u64::from(*run - 1) * u64::from(layout.block_length().get())
                    + u64::from(layout.block_len(last))
            }
        }
    }
}

/// Ordered instruction stream that reconstructs a target from a basis.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeltaScript {
    tokens: Vec<DeltaToken>,
    total_bytes: u64,
    literal_bytes: u64,
}

impl DeltaScript {
    /// Creates a script from tokens and precomputed byte counts.
    #[must_use]
    pub const fn new(tokens: Vec<DeltaToken>, total_bytes: u64, literal_bytes: u64) -> Self {
        Self {
            tokens,
            total_bytes,
            literal_bytes,
        }
    }

    /// Creates a script from tokens, deriving byte counts under `layout`.
    #[must_use]
    pub fn from_tokens(tokens: Vec<DeltaToken>, layout: &SignatureLayout) -> Self {
        let mut total_bytes = 0u64;
        let mut literal_bytes = 0u64;
        for token in &tokens {
            let len = token.byte_len(layout);
            total_bytes += len;
            if token.is_literal() {
                literal_bytes += len;
            }
        }
        Self {
            tokens,
            total_bytes,
            literal_bytes,
        }
    }

    /// Returns the instruction stream.
    #[must_use]
    pub fn tokens(&self) -> &[DeltaToken] {
        &self.tokens
    }

    /// Consumes the script and returns its instructions.
    #[must_use]
    pub fn into_tokens(self) -> Vec<DeltaToken> {
        self.tokens
    }

    /// Returns the total number of bytes the script reconstructs.
    #[must_use]
    pub const fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Returns the number of bytes carried as literals.
    #[must_use]
    pub const fn literal_bytes(&self) -> u64 {
        self.literal_bytes
    }

    /// Returns the number of bytes copied from the basis.
    #[must_use]
    pub fn matched_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.literal_bytes)
    }

    /// Returns `true` when the script carries no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Counters accumulated during a matching pass.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DeltaStats {
    /// Bytes described by the emitted instructions.
    pub total_bytes: u64,
    /// Bytes emitted as literals.
    pub literal_bytes: u64,
    /// Bytes covered by block copies.
    pub matched_bytes: u64,
    /// Confirmed block matches.
    pub hash_hits: u64,
    /// Weak-checksum hits that failed strong verification.
    pub false_alarms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::num::{NonZeroU32, NonZeroU8};

    fn layout(count: u64, block_length: u32, remainder: u32) -> SignatureLayout {
        SignatureLayout::from_raw_parts(
            NonZeroU32::new(block_length).expect("non-zero"),
            remainder,
            count,
            NonZeroU8::new(16).expect("non-zero"),
        )
    }

    #[test]
    fn literal_byte_len_is_its_payload() {
        let layout = layout(4, 16, 0);
        let token = DeltaToken::Literal(vec![0; 5]);
        assert_eq!(token.byte_len(&layout), 5);
    }

    #[test]
    fn copy_byte_len_accounts_for_the_short_tail() {
        let layout = layout(3, 16, 5);
        assert_eq!(DeltaToken::Copy { index: 0, run: 1 }.byte_len(&layout), 16);
        assert_eq!(DeltaToken::Copy { index: 2, run: 1 }.byte_len(&layout), 5);
        assert_eq!(DeltaToken::Copy { index: 0, run: 3 }.byte_len(&layout), 37);
    }

    #[test]
    fn from_tokens_totals_each_kind() {
        let layout = layout(3, 16, 5);
        let script = DeltaScript::from_tokens(
            vec![
                DeltaToken::Copy { index: 0, run: 2 },
                DeltaToken::Literal(b"abc".to_vec()),
                DeltaToken::Copy { index: 2, run: 1 },
            ],
            &layout,
        );
        assert_eq!(script.total_bytes(), 32 + 3 + 5);
        assert_eq!(script.literal_bytes(), 3);
        assert_eq!(script.matched_bytes(), 37);
    }

    #[test]
    fn empty_script_reports_empty() {
        let script = DeltaScript::new(Vec::new(), 0, 0);
        assert!(script.is_empty());
        assert_eq!(script.total_bytes(), 0);
    }
}
