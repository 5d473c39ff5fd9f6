//! End-to-end scenarios with literal values.
//!
//! All cases run with a zero seed, protocol 30 (MD5), and a forced 16-byte
//! block so the expected instruction streams can be written out by hand.

use core::num::{NonZeroU32, NonZeroU8};
use std::io::Cursor;

use matching::{apply_delta, generate_delta, DeltaToken, SignatureIndex};
use protocol::{ProtocolVersion, SessionContext};
use signature::{
    calculate_signature_layout, generate_file_signature, FileSignature, SignatureLayoutParams,
};

fn session() -> SessionContext {
    SessionContext::new(ProtocolVersion::new(30).expect("supported"))
}

fn signature_16(basis: &[u8], ctx: &SessionContext) -> FileSignature {
    let params = SignatureLayoutParams::new(
        basis.len() as u64,
        NonZeroU32::new(16),
        ctx.protocol(),
        ctx.checksum(),
        NonZeroU8::new(16).expect("non-zero"),
    );
    let layout = calculate_signature_layout(params).expect("layout");
    generate_file_signature(Cursor::new(basis), layout, ctx).expect("signature")
}

fn run(basis: &[u8], target: &[u8]) -> (FileSignature, Vec<DeltaToken>, Vec<u8>) {
    let ctx = session();
    let signature = signature_16(basis, &ctx);
    let index = SignatureIndex::build(&signature, &ctx).expect("index");
    let script = generate_delta(&index, target, &ctx).expect("delta");

    let mut reconstructed = Vec::new();
    let layout = signature.layout();
    apply_delta(basis, &script, &layout, &mut reconstructed).expect("apply");
    assert_eq!(reconstructed, target, "round trip must hold");

    (signature, script.into_tokens(), reconstructed)
}

#[test]
fn identical_single_block_basis() {
    let basis = b"ABCDEFGHIJKLMNOP";
    let (signature, tokens, _) = run(basis, basis);

    assert_eq!(signature.layout().block_count(), 1);
    assert_eq!(signature.layout().remainder(), 0);
    assert_eq!(tokens, vec![DeltaToken::Copy { index: 0, run: 1 }]);
}

#[test]
fn mid_file_replacement_splits_the_stream() {
    let basis: Vec<u8> = b"ABCD".iter().copied().cycle().take(64).collect();
    let mut target = basis[..32].to_vec();
    target.extend_from_slice(b"ZZZZ");
    target.extend_from_slice(&basis[36..]);

    let (_, tokens, _) = run(&basis, &target);

    assert_eq!(
        tokens,
        vec![
            DeltaToken::Copy { index: 0, run: 2 },
            DeltaToken::Literal(b"ZZZZ".to_vec()),
            DeltaToken::Copy { index: 2, run: 1 },
            DeltaToken::Literal(basis[52..].to_vec()),
        ]
    );
}

#[test]
fn short_last_block_matches_with_the_short_strong_sum() {
    let basis = vec![b'a'; 17];
    let (signature, tokens, _) = run(&basis, &basis);

    assert_eq!(signature.layout().block_count(), 2);
    assert_eq!(signature.layout().remainder(), 1);
    assert_eq!(tokens, vec![DeltaToken::Copy { index: 0, run: 2 }]);
}

#[test]
fn empty_basis_sends_everything_as_one_literal() {
    let (signature, tokens, _) = run(&[], b"hello");

    assert_eq!(signature.layout().block_count(), 0);
    assert_eq!(tokens, vec![DeltaToken::Literal(b"hello".to_vec())]);
}

#[test]
fn duplicated_blocks_pick_the_lowest_index_and_run() {
    let basis: Vec<u8> = b"XYXY".iter().copied().cycle().take(40).collect();
    let target: Vec<u8> = b"XY".iter().copied().cycle().take(40).collect();
    assert_eq!(basis, target);

    let (_, tokens, _) = run(&basis, &target);
    assert_eq!(tokens, vec![DeltaToken::Copy { index: 0, run: 3 }]);
}

#[test]
fn wire_form_of_the_single_block_delta() {
    let ctx = session();
    let basis = b"ABCDEFGHIJKLMNOP";
    let signature = signature_16(basis, &ctx);
    let index = SignatureIndex::build(&signature, &ctx).expect("index");
    let script = generate_delta(&index, basis, &ctx).expect("delta");

    let encoded = matching::stream::encode_delta(&script, &ctx).expect("encode");
    // COPY(0) as -1, then the end-of-stream token.
    assert_eq!(&encoded[..4], &(-1i32).to_le_bytes());
    assert_eq!(&encoded[4..], &0i32.to_le_bytes());
}

#[test]
fn single_byte_edits_at_the_boundaries() {
    let basis: Vec<u8> = (0..160u32).map(|i| (i.wrapping_mul(13) % 251) as u8).collect();

    for position in [0usize, 80, 159] {
        let mut target = basis.clone();
        target[position] ^= 0x80;
        let (_, tokens, reconstructed) = run(&basis, &target);
        assert_eq!(reconstructed, target, "edit at {position}");
        assert!(
            tokens.iter().any(DeltaToken::is_literal),
            "edit at {position} must produce a literal"
        );
    }
}

#[test]
fn block_aligned_deletion_keeps_the_remaining_copies() {
    let basis: Vec<u8> = (0..96u32).map(|i| (i.wrapping_mul(17) % 251) as u8).collect();
    // Drop the middle block (bytes 32..48).
    let mut target = basis[..32].to_vec();
    target.extend_from_slice(&basis[48..]);

    let (_, tokens, _) = run(&basis, &target);
    assert_eq!(
        tokens,
        vec![
            DeltaToken::Copy { index: 0, run: 2 },
            DeltaToken::Copy { index: 3, run: 3 },
        ]
    );
}
