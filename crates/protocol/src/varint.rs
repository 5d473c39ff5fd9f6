//! Integer codecs matching `io.c`.
//!
//! Three families cover the supported protocol range:
//!
//! - plain 4-byte little-endian integers ([`read_int`]/[`write_int`]), used
//!   by the sum head and the token stream at every version;
//! - the variable-length 32-bit form ([`read_varint`]/[`write_varint`]) used
//!   by protocols 27 and newer, with the tag-byte lookup table copied from
//!   upstream so the encodings agree byte for byte;
//! - 64-bit forms: the legacy dual encoding ([`read_longint`]/
//!   [`write_longint`]) for protocols below 30 and the `min_bytes`
//!   parameterised [`read_varlong`]/[`write_varlong`] used afterwards.
//!
//! All decoders are total: truncated or over-long input produces an error,
//! never a panic, and every encoder/decoder pair round-trips.

use std::io::{self, Read, Write};

/// Continuation-byte count lookup for the variable-length integer codec.
///
/// Mirrors `int_byte_extra` from `io.c`: each entry gives the number of extra
/// bytes that follow the leading tag for a particular high-bit pattern.
const INT_BYTE_EXTRA: [u8; 64] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // (0x00-0x3F) / 4
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // (0x40-0x7F) / 4
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, // (0x80-0xBF) / 4
    2, 2, 2, 2, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 5, 6, // (0xC0-0xFF) / 4
];

/// Maximum number of continuation bytes a 32-bit varint may carry.
const MAX_EXTRA_BYTES: usize = 4;

/// Marker value the legacy 64-bit encoding uses to announce a wide value.
const LONGINT_MARKER: u32 = 0xFFFF_FFFF;

fn invalid_data(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

/// Writes a 4-byte signed little-endian integer (`io.c:write_int`).
#[inline]
pub fn write_int<W: Write + ?Sized>(writer: &mut W, value: i32) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

/// Reads a 4-byte signed little-endian integer (`io.c:read_int`).
#[inline]
pub fn read_int<R: Read + ?Sized>(reader: &mut R) -> io::Result<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn encode_bytes(value: i32) -> (usize, [u8; 5]) {
    let mut bytes = [0u8; 5];
    bytes[1..5].copy_from_slice(&value.to_le_bytes());

    let mut count = 4usize;
    while count > 1 && bytes[count] == 0 {
        count -= 1;
    }

    let shift = 7 - ((count - 1) as u32);
    let bit = 1u8 << shift;
    let current = bytes[count];

    if current >= bit {
        count += 1;
        bytes[0] = !(bit - 1);
    } else if count > 1 {
        let double_bit = bit << 1;
        let mask = !(double_bit - 1);
        bytes[0] = current | mask;
    } else {
        bytes[0] = bytes[1];
    }

    (count, bytes)
}

fn decode_bytes(bytes: &[u8]) -> io::Result<(i32, usize)> {
    let Some(&first) = bytes.first() else {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "truncated variable-length integer",
        ));
    };

    let extra = INT_BYTE_EXTRA[(first / 4) as usize] as usize;
    if extra > MAX_EXTRA_BYTES {
        return Err(invalid_data("overflow in read_varint"));
    }

    if bytes.len() < 1 + extra {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "truncated variable-length integer",
        ));
    }

    let mut buf = [0u8; 5];
    if extra > 0 {
        buf[..extra].copy_from_slice(&bytes[1..1 + extra]);
        let bit = 1u8 << (8 - extra as u32);
        buf[extra] = first & (bit - 1);
    } else {
        buf[0] = first;
    }

    let value = i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    Ok((value, 1 + extra))
}

/// Encodes `value` using the variable-length integer format and writes it to
/// `writer` (`io.c:write_varint`).
///
/// # Errors
///
/// Propagates any error returned by `writer`.
pub fn write_varint<W: Write + ?Sized>(writer: &mut W, value: i32) -> io::Result<()> {
    let (len, bytes) = encode_bytes(value);
    writer.write_all(&bytes[..len])
}

/// Appends the variable-length encoding of `value` to `out`.
///
/// Slice-based counterpart of [`write_varint`] for fixtures and golden tests.
pub fn encode_varint_to_vec(value: i32, out: &mut Vec<u8>) {
    let (len, bytes) = encode_bytes(value);
    out.extend_from_slice(&bytes[..len]);
}

/// Decodes a variable-length integer from `reader` (`io.c:read_varint`).
///
/// # Errors
///
/// Returns [`io::ErrorKind::UnexpectedEof`] when the reader does not provide
/// the announced bytes and [`io::ErrorKind::InvalidData`] when the encoding
/// claims more continuation bytes than the 32-bit range allows.
pub fn read_varint<R: Read + ?Sized>(reader: &mut R) -> io::Result<i32> {
    let mut first = [0u8; 1];
    reader.read_exact(&mut first)?;

    let extra = INT_BYTE_EXTRA[(first[0] / 4) as usize] as usize;
    if extra > MAX_EXTRA_BYTES {
        return Err(invalid_data("overflow in read_varint"));
    }

    let mut buf = [0u8; 5];
    if extra > 0 {
        reader.read_exact(&mut buf[..extra])?;
        let bit = 1u8 << (8 - extra as u32);
        buf[extra] = first[0] & (bit - 1);
    } else {
        buf[0] = first[0];
    }

    Ok(i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]))
}

/// Decodes a variable-length integer from the front of `bytes`, returning the
/// value together with the unconsumed remainder.
///
/// # Errors
///
/// Same conditions as [`read_varint`].
pub fn decode_varint(bytes: &[u8]) -> io::Result<(i32, &[u8])> {
    let (value, consumed) = decode_bytes(bytes)?;
    Ok((value, &bytes[consumed..]))
}

/// Writes a 64-bit integer in the `min_bytes` parameterised variable form
/// (`io.c:write_varlong`).
///
/// The value is packed into the minimum number of bytes; the leading byte's
/// high bits announce how many bytes beyond `min_bytes` follow.
///
/// # Errors
///
/// Propagates any error returned by `writer`.
pub fn write_varlong<W: Write + ?Sized>(
    writer: &mut W,
    value: i64,
    min_bytes: u8,
) -> io::Result<()> {
    let bytes = value.to_le_bytes();

    let mut cnt = 8usize;
    while cnt > min_bytes as usize && bytes[cnt - 1] == 0 {
        cnt -= 1;
    }

    // Wrapping arithmetic keeps the shift in range when cnt exceeds 7.
    let bit = 1u8 << ((7 + min_bytes as usize).wrapping_sub(cnt));
    let leading = if bytes[cnt - 1] >= bit {
        cnt += 1;
        !(bit - 1)
    } else if cnt > min_bytes as usize {
        bytes[cnt - 1] | !(bit * 2 - 1)
    } else {
        bytes[cnt - 1]
    };

    writer.write_all(&[leading])?;
    writer.write_all(&bytes[..cnt - 1])
}

/// Reads a 64-bit integer in the `min_bytes` parameterised variable form
/// (`io.c:read_varlong`).
///
/// `min_bytes` must match the value used when writing.
///
/// # Errors
///
/// Returns [`io::ErrorKind::UnexpectedEof`] when the announced bytes are not
/// available.
pub fn read_varlong<R: Read + ?Sized>(reader: &mut R, min_bytes: u8) -> io::Result<i64> {
    let mut leading_buf = [0u8; 1];
    reader.read_exact(&mut leading_buf)?;
    let leading = leading_buf[0];

    // Each consecutive high bit set announces one byte beyond min_bytes.
    let mut cnt = min_bytes as usize;
    let mut bit = 1u8 << 7;
    while cnt < 9 && (leading & bit) != 0 {
        cnt += 1;
        bit >>= 1;
    }

    let mut bytes = [0u8; 8];
    if cnt >= 9 {
        // The tag carried flags only; all eight value bytes follow.
        reader.read_exact(&mut bytes)?;
        return Ok(i64::from_le_bytes(bytes));
    }

    let mask = if cnt == min_bytes as usize {
        0xFF
    } else {
        // `bit` is the first clear flag bit; everything below it is data.
        bit.wrapping_sub(1)
    };

    if cnt > 1 {
        reader.read_exact(&mut bytes[..cnt - 1])?;
    }
    bytes[cnt - 1] = leading & mask;

    Ok(i64::from_le_bytes(bytes))
}

/// Writes a 64-bit integer using the legacy dual encoding of protocols below
/// 30 (`io.c:write_longint`).
///
/// Values representable as a non-negative `i32` occupy 4 bytes; anything else
/// is announced with a `0xFFFFFFFF` marker followed by the full 8-byte value.
///
/// # Errors
///
/// Propagates any error returned by `writer`.
pub fn write_longint<W: Write + ?Sized>(writer: &mut W, value: i64) -> io::Result<()> {
    if (0..=i64::from(i32::MAX)).contains(&value) {
        writer.write_all(&(value as i32).to_le_bytes())
    } else {
        writer.write_all(&LONGINT_MARKER.to_le_bytes())?;
        writer.write_all(&value.to_le_bytes())
    }
}

/// Reads a 64-bit integer in the legacy dual encoding (`io.c:read_longint`).
///
/// # Errors
///
/// Returns [`io::ErrorKind::UnexpectedEof`] when the stream ends inside the
/// marker-announced wide value.
pub fn read_longint<R: Read + ?Sized>(reader: &mut R) -> io::Result<i64> {
    let mut narrow = [0u8; 4];
    reader.read_exact(&mut narrow)?;
    if u32::from_le_bytes(narrow) != LONGINT_MARKER {
        return Ok(i64::from(i32::from_le_bytes(narrow)));
    }

    let mut wide = [0u8; 8];
    reader.read_exact(&mut wide)?;
    Ok(i64::from_le_bytes(wide))
}
