use super::digest::RollingDigest;
use super::error::RollingError;

/// Rolling checksum used for weak block matching (rsync's `rsum`).
///
/// The checksum follows the Adler-32 variant used during delta transfer: `s1`
/// accumulates the byte sum and `s2` the sum of the running prefix sums. Both
/// halves are truncated to 16 bits whenever a value is read out, which keeps
/// the packed form comparable with the values a peer computes.
#[doc(alias = "rsum")]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RollingChecksum {
    s1: u32,
    s2: u32,
    len: usize,
}

impl RollingChecksum {
    /// Creates a new rolling checksum with zeroed state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            s1: 0,
            s2: 0,
            len: 0,
        }
    }

    /// Resets the checksum back to its initial state.
    pub fn reset(&mut self) {
        self.s1 = 0;
        self.s2 = 0;
        self.len = 0;
    }

    /// Returns the number of bytes that contributed to the current state.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no bytes have been observed yet.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Updates the checksum with an additional slice of bytes.
    #[inline]
    pub fn update(&mut self, chunk: &[u8]) {
        let mut s1 = self.s1;
        let mut s2 = self.s2;

        let mut blocks = chunk.chunks_exact(4);
        for block in &mut blocks {
            s1 = s1.wrapping_add(u32::from(block[0]));
            s2 = s2.wrapping_add(s1);

            s1 = s1.wrapping_add(u32::from(block[1]));
            s2 = s2.wrapping_add(s1);

            s1 = s1.wrapping_add(u32::from(block[2]));
            s2 = s2.wrapping_add(s1);

            s1 = s1.wrapping_add(u32::from(block[3]));
            s2 = s2.wrapping_add(s1);
        }
        for &byte in blocks.remainder() {
            s1 = s1.wrapping_add(u32::from(byte));
            s2 = s2.wrapping_add(s1);
        }

        self.s1 = s1 & 0xffff;
        self.s2 = s2 & 0xffff;
        self.len = self.len.saturating_add(chunk.len());
    }

    /// Recomputes the state for a fresh block.
    ///
    /// Clears the internal state before delegating to [`update`](Self::update),
    /// which is the common operation after a confirmed block match moves the
    /// window to an unrelated offset.
    pub fn update_from_block(&mut self, block: &[u8]) {
        self.reset();
        self.update(block);
    }

    /// Slides the window one byte forward, removing `outgoing` and appending
    /// `incoming`.
    ///
    /// # Errors
    ///
    /// Returns [`RollingError::EmptyWindow`] if the checksum has not been
    /// seeded with a block and [`RollingError::WindowTooLarge`] when the
    /// window length exceeds what the algorithm supports (32 bits).
    #[inline]
    pub fn roll(&mut self, outgoing: u8, incoming: u8) -> Result<(), RollingError> {
        let window_len = self.window_len_u32()?;

        let out = u32::from(outgoing);
        let inn = u32::from(incoming);

        let new_s1 = self.s1.wrapping_sub(out).wrapping_add(inn) & 0xffff;
        let new_s2 = self
            .s2
            .wrapping_sub(window_len.wrapping_mul(out))
            .wrapping_add(new_s1)
            & 0xffff;

        self.s1 = new_s1;
        self.s2 = new_s2;
        Ok(())
    }

    /// Shrinks the window by one byte from the front without appending.
    ///
    /// Used when the scan approaches the end of the target and the window
    /// must contract towards the remainder length.
    ///
    /// # Errors
    ///
    /// Returns [`RollingError::EmptyWindow`] when there is no byte to remove
    /// and [`RollingError::WindowTooLarge`] for oversized windows.
    #[inline]
    pub fn roll_out(&mut self, outgoing: u8) -> Result<(), RollingError> {
        let window_len = self.window_len_u32()?;

        let out = u32::from(outgoing);
        self.s1 = self.s1.wrapping_sub(out) & 0xffff;
        self.s2 = self.s2.wrapping_sub(window_len.wrapping_mul(out)) & 0xffff;
        self.len -= 1;
        Ok(())
    }

    /// Returns the rolling checksum in rsync's packed 32-bit representation.
    #[must_use]
    pub const fn value(&self) -> u32 {
        ((self.s2 & 0xffff) << 16) | (self.s1 & 0xffff)
    }

    /// Returns the packed value with the session seed folded into `s2`.
    ///
    /// See [`RollingDigest::value_with_seed`] for the folding rule.
    #[must_use]
    pub const fn value_with_seed(&self, seed: u32) -> u32 {
        self.digest().value_with_seed(seed)
    }

    /// Returns the current state as a structured digest.
    #[must_use]
    pub const fn digest(&self) -> RollingDigest {
        RollingDigest::new(
            (self.s1 & 0xffff) as u16,
            (self.s2 & 0xffff) as u16,
            self.len,
        )
    }

    #[inline]
    fn window_len_u32(&self) -> Result<u32, RollingError> {
        if self.len == 0 {
            return Err(RollingError::EmptyWindow);
        }

        u32::try_from(self.len).map_err(|_| RollingError::WindowTooLarge { len: self.len })
    }
}

impl From<&RollingChecksum> for RollingDigest {
    fn from(checksum: &RollingChecksum) -> Self {
        checksum.digest()
    }
}
