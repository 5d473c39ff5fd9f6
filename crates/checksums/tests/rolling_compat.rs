//! Compatibility vectors for the rolling weak checksum.
//!
//! The packed values below were derived from the `s1`/`s2` definition used by
//! the C implementation's `get_checksum1`: `s1` is the byte sum and `s2` the
//! sum of running prefix sums, both modulo 2^16.

use checksums::{RollingChecksum, RollingDigest};

fn reference_value(data: &[u8]) -> u32 {
    let mut s1 = 0u32;
    let mut s2 = 0u32;
    for &byte in data {
        s1 = s1.wrapping_add(u32::from(byte));
        s2 = s2.wrapping_add(s1);
    }
    ((s2 & 0xffff) << 16) | (s1 & 0xffff)
}

#[test]
fn known_values_for_short_windows() {
    let cases: [(&[u8], u32); 4] = [
        (b"", 0),
        (b"\x00", 0),
        (b"a", 0x0061_0061),
        (b"abc", 0x024a_0126),
    ];

    for (input, expected) in cases {
        assert_eq!(
            RollingDigest::from_bytes(input).value(),
            expected,
            "input {input:?}"
        );
    }
}

#[test]
fn block_sized_windows_match_reference() {
    let block: Vec<u8> = (0..700u32).map(|i| (i % 256) as u8).collect();
    let mut checksum = RollingChecksum::new();
    checksum.update(&block);
    assert_eq!(checksum.value(), reference_value(&block));
}

#[test]
fn sliding_across_a_large_buffer_matches_reference() {
    let data: Vec<u8> = (0..8192u32).map(|i| (i.wrapping_mul(31) % 256) as u8).collect();
    let window = 700;

    let mut rolling = RollingChecksum::new();
    rolling.update(&data[..window]);

    for start in 1..=(data.len() - window) {
        rolling
            .roll(data[start - 1], data[start + window - 1])
            .expect("window is seeded");
        assert_eq!(
            rolling.value(),
            reference_value(&data[start..start + window]),
            "offset {start}"
        );
    }
}

#[test]
fn seed_folding_only_touches_the_upper_half() {
    let data = b"weak checksum with a session seed";
    let mut checksum = RollingChecksum::new();
    checksum.update(data);

    for seed in [0u32, 1, 0x1234_5678, u32::MAX] {
        let folded = checksum.value_with_seed(seed);
        assert_eq!(folded & 0xffff, checksum.value() & 0xffff, "seed {seed}");
    }
}
