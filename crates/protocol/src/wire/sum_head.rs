//! Signature sum-head layout (`io.c:read_sum_head`/`write_sum_head`).
//!
//! The header is four little-endian `int32` fields in fixed order: block
//! count, block length, strong-sum truncation, and remainder. Protocols below
//! 27 omit the strong-sum field on the wire; readers substitute the short-sum
//! length both sides assume. The per-block entries that follow the header
//! (weak checksum plus truncated strong digest) are owned by the signature
//! layer; this module only frames the header.

use std::io::{Read, Write};

use crate::error::WireError;
use crate::varint::{read_int, write_int};
use crate::version::ProtocolVersion;

/// Strong-sum truncation assumed by peers below protocol 27.
pub const SHORT_SUM_LENGTH: u32 = 2;

/// Widest strong digest any negotiable checksum produces (SHA-256).
const MAX_STRONG_SUM_LENGTH: u32 = 32;

/// Decoded signature header.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SumHead {
    /// Number of block entries that follow the header.
    pub count: u32,
    /// Nominal block length in bytes.
    pub block_length: u32,
    /// Bytes kept of each block's strong digest.
    pub s2_length: u32,
    /// Length of the trailing short block, zero when the basis divides evenly.
    pub remainder: u32,
}

impl SumHead {
    /// Returns the length in bytes of block `index` under this header.
    #[must_use]
    pub const fn block_len(&self, index: u32) -> u32 {
        if self.remainder != 0 && index + 1 == self.count {
            self.remainder
        } else {
            self.block_length
        }
    }

    /// Returns the total basis length the header describes.
    #[must_use]
    pub const fn basis_len(&self) -> u64 {
        if self.count == 0 {
            return 0;
        }
        let full_blocks = if self.remainder != 0 {
            self.count - 1
        } else {
            self.count
        };
        full_blocks as u64 * self.block_length as u64 + self.remainder as u64
    }

    fn validate(&self, protocol: ProtocolVersion) -> Result<(), WireError> {
        if self.block_length > protocol.max_block_length() {
            return Err(WireError::Malformed("block length exceeds protocol maximum"));
        }
        if self.count > 0 && self.block_length == 0 {
            return Err(WireError::Malformed("zero block length with blocks present"));
        }
        if self.remainder >= self.block_length && self.remainder != 0 {
            return Err(WireError::Malformed("remainder not shorter than block length"));
        }
        if self.s2_length > MAX_STRONG_SUM_LENGTH {
            return Err(WireError::Malformed("strong-sum length out of range"));
        }
        if self.count > 0 && self.s2_length == 0 {
            return Err(WireError::Malformed("zero strong-sum length with blocks present"));
        }
        Ok(())
    }
}

/// Writes a sum head in the layout of the agreed protocol version.
///
/// # Errors
///
/// Returns [`WireError::Malformed`] when the header cannot be represented at
/// this version (a field exceeding `i32`, or a strong-sum length other than
/// the implied short sum below protocol 27) and propagates writer failures.
pub fn write_sum_head<W: Write + ?Sized>(
    writer: &mut W,
    head: &SumHead,
    protocol: ProtocolVersion,
) -> Result<(), WireError> {
    head.validate(protocol)?;

    let carries_s2 = protocol.sum_head_carries_s2length();
    if !carries_s2 && head.s2_length != SHORT_SUM_LENGTH && head.count > 0 {
        return Err(WireError::Malformed(
            "strong-sum length not representable below protocol 27",
        ));
    }

    write_int(writer, as_wire_int(head.count)?)?;
    write_int(writer, as_wire_int(head.block_length)?)?;
    if carries_s2 {
        write_int(writer, as_wire_int(head.s2_length)?)?;
    }
    write_int(writer, as_wire_int(head.remainder)?)?;
    Ok(())
}

/// Reads a sum head in the layout of the agreed protocol version.
///
/// Arbitrary input either decodes or fails with [`WireError::Malformed`];
/// the reader never panics and never consumes past the announced fields.
///
/// # Errors
///
/// Returns [`WireError::Malformed`] for truncated input, negative fields, or
/// a header that contradicts itself.
pub fn read_sum_head<R: Read + ?Sized>(
    reader: &mut R,
    protocol: ProtocolVersion,
) -> Result<SumHead, WireError> {
    let count = read_wire_field(reader)?;
    let block_length = read_wire_field(reader)?;
    let s2_length = if protocol.sum_head_carries_s2length() {
        read_wire_field(reader)?
    } else {
        SHORT_SUM_LENGTH
    };
    let remainder = read_wire_field(reader)?;

    let head = SumHead {
        count,
        block_length,
        s2_length,
        remainder,
    };
    head.validate(protocol)?;
    Ok(head)
}

fn read_wire_field<R: Read + ?Sized>(reader: &mut R) -> Result<u32, WireError> {
    let value = read_int(reader).map_err(WireError::from_read_error)?;
    u32::try_from(value).map_err(|_| WireError::Malformed("negative sum-head field"))
}

fn as_wire_int(value: u32) -> Result<i32, WireError> {
    i32::try_from(value).map_err(|_| WireError::Malformed("sum-head field exceeds int32"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn v(version: u8) -> ProtocolVersion {
        ProtocolVersion::new(version).expect("supported version")
    }

    #[test]
    fn round_trip_with_explicit_s2_length() {
        let head = SumHead {
            count: 100,
            block_length: 4096,
            s2_length: 16,
            remainder: 512,
        };

        let mut buf = Vec::new();
        write_sum_head(&mut buf, &head, v(30)).expect("write");
        assert_eq!(buf.len(), 16);

        let decoded = read_sum_head(&mut Cursor::new(&buf), v(30)).expect("read");
        assert_eq!(decoded, head);
    }

    #[test]
    fn legacy_layout_omits_s2_length() {
        let head = SumHead {
            count: 50,
            block_length: 8192,
            s2_length: SHORT_SUM_LENGTH,
            remainder: 0,
        };

        let mut buf = Vec::new();
        write_sum_head(&mut buf, &head, v(26)).expect("write");
        assert_eq!(buf.len(), 12);

        let decoded = read_sum_head(&mut Cursor::new(&buf), v(26)).expect("read");
        assert_eq!(decoded.s2_length, SHORT_SUM_LENGTH);
        assert_eq!(decoded.count, 50);
        assert_eq!(decoded.remainder, 0);
    }

    #[test]
    fn legacy_layout_rejects_wide_strong_sums() {
        let head = SumHead {
            count: 1,
            block_length: 700,
            s2_length: 16,
            remainder: 0,
        };

        let mut buf = Vec::new();
        let err = write_sum_head(&mut buf, &head, v(26)).expect_err("reject");
        assert!(err.is_malformed());
    }

    #[test]
    fn empty_head_round_trips() {
        let head = SumHead {
            count: 0,
            block_length: 700,
            s2_length: 16,
            remainder: 0,
        };

        let mut buf = Vec::new();
        write_sum_head(&mut buf, &head, v(31)).expect("write");
        let decoded = read_sum_head(&mut Cursor::new(&buf), v(31)).expect("read");
        assert_eq!(decoded, head);
    }

    #[test]
    fn field_order_matches_io_c() {
        let head = SumHead {
            count: 1,
            block_length: 2,
            s2_length: 3,
            remainder: 1,
        };

        let mut buf = Vec::new();
        write_sum_head(&mut buf, &head, v(32)).expect("write");
        assert_eq!(
            buf,
            [1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0, 1, 0, 0, 0],
        );
    }

    #[test]
    fn negative_fields_are_malformed() {
        let mut buf = Vec::new();
        write_int(&mut buf, -1).expect("write");
        write_int(&mut buf, 700).expect("write");
        write_int(&mut buf, 16).expect("write");
        write_int(&mut buf, 0).expect("write");

        let err = read_sum_head(&mut Cursor::new(&buf), v(30)).expect_err("reject");
        assert!(err.is_malformed());
    }

    #[test]
    fn truncated_input_is_malformed() {
        let err = read_sum_head(&mut Cursor::new(&[0u8; 7]), v(30)).expect_err("reject");
        assert!(err.is_malformed());
    }

    #[test]
    fn contradictory_headers_are_malformed() {
        // Remainder as long as the block length.
        let mut buf = Vec::new();
        for field in [2i32, 700, 16, 700] {
            write_int(&mut buf, field).expect("write");
        }
        assert!(read_sum_head(&mut Cursor::new(&buf), v(30))
            .expect_err("reject")
            .is_malformed());

        // Blocks present but no block length.
        let mut buf = Vec::new();
        for field in [3i32, 0, 16, 0] {
            write_int(&mut buf, field).expect("write");
        }
        assert!(read_sum_head(&mut Cursor::new(&buf), v(30))
            .expect_err("reject")
            .is_malformed());
    }

    #[test]
    fn block_len_accounts_for_the_remainder() {
        let head = SumHead {
            count: 3,
            block_length: 16,
            s2_length: 16,
            remainder: 5,
        };
        assert_eq!(head.block_len(0), 16);
        assert_eq!(head.block_len(1), 16);
        assert_eq!(head.block_len(2), 5);
        assert_eq!(head.basis_len(), 37);
    }

    #[test]
    fn basis_len_of_empty_head_is_zero() {
        assert_eq!(SumHead::default().basis_len(), 0);
    }
}
