//! Robustness of the wire decoders against arbitrary input.
//!
//! Random byte soup fed into the sum-head and token decoders must either
//! decode or fail with a malformed-input error; it must never panic and
//! never read past the announced lengths.

use std::io::Cursor;

use proptest::prelude::*;

use protocol::wire::{read_sum_head, read_token};
use protocol::{ProtocolVersion, WireError};

fn all_versions() -> Vec<ProtocolVersion> {
    (20u8..=32).filter_map(ProtocolVersion::new).collect()
}

proptest! {
    #[test]
    fn sum_head_decoder_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        for protocol in all_versions() {
            let mut cursor = Cursor::new(bytes.as_slice());
            match read_sum_head(&mut cursor, protocol) {
                Ok(head) => {
                    // A decoded head must be self-consistent.
                    prop_assert!(head.remainder == 0 || head.remainder < head.block_length);
                    prop_assert!(head.block_length <= protocol.max_block_length());
                }
                Err(err) => prop_assert!(matches!(err, WireError::Malformed(_))),
            }
        }
    }

    #[test]
    fn token_decoder_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let mut cursor = Cursor::new(bytes.as_slice());
        loop {
            match read_token(&mut cursor) {
                Ok(protocol::wire::Token::End) => break,
                Ok(_) => continue,
                Err(err) => {
                    prop_assert!(matches!(err, WireError::Malformed(_)));
                    break;
                }
            }
        }
    }

    #[test]
    fn sum_head_decoder_consumes_only_announced_fields(
        count in 0i32..1000,
        blength in 0i32..8192,
        s2 in 0i32..64,
        remainder in 0i32..8192,
        trailer in prop::collection::vec(any::<u8>(), 0..16),
    ) {
        let mut buf = Vec::new();
        for field in [count, blength, s2, remainder] {
            protocol::varint::write_int(&mut buf, field).expect("write");
        }
        let head_len = buf.len();
        buf.extend_from_slice(&trailer);

        let protocol_version = ProtocolVersion::new(30).expect("supported");
        let mut cursor = Cursor::new(buf.as_slice());
        if read_sum_head(&mut cursor, protocol_version).is_ok() {
            prop_assert_eq!(cursor.position() as usize, head_len);
        }
    }
}
