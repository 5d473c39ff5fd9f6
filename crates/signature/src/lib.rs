#![deny(unsafe_code)]

//! Block signature layout and generation.
//!
//! A signature describes a basis file as a sequence of fixed-size blocks,
//! each fingerprinted by the rolling weak checksum and a truncated strong
//! digest. Producing one involves two steps:
//!
//! 1. derive the [`SignatureLayout`] (block length, strong-sum truncation,
//!    block count, remainder) from the basis length and session parameters
//!    via [`calculate_signature_layout`], which ports the square-root
//!    heuristic from `generator.c:sum_sizes_sqroot`;
//! 2. read the basis and fingerprint each block with
//!    [`generate_file_signature`].
//!
//! The [`wire`] module serialises signatures in the `io.c` layout so they
//! interoperate with peers speaking protocol versions 20 through 32.

mod algorithm;
mod block;
mod file;
mod generation;
mod layout;
pub mod wire;

pub use algorithm::{SignatureAlgorithm, StrongHasher};
pub use block::SignatureBlock;
pub use file::FileSignature;
pub use generation::{generate_file_signature, SignatureError};
pub use layout::{
    calculate_signature_layout, SignatureLayout, SignatureLayoutError, SignatureLayoutParams,
    BLOCK_SIZE, BLOCKSUM_BIAS,
};
