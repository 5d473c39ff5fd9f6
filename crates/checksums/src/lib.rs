#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Checksum primitives for the deltasync delta-transfer engine.
//!
//! The crate exposes the rolling weak checksum (`rsum`) used for cheap block
//! fingerprinting together with the strong digests negotiable across rsync
//! protocol versions 20 through 32: MD4, MD5, SHA-1, SHA-256, XXH64, XXH3/64,
//! and XXH3/128. The `signature` and `match` layers compose these primitives
//! into block signatures and delta streams.

mod rolling;
pub mod strong;

pub use rolling::{RollingChecksum, RollingDigest, RollingError};
