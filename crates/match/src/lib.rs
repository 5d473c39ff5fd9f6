#![deny(unsafe_code)]

//! Block matching and delta generation.
//!
//! This crate implements the delta-transfer algorithm proper:
//!
//! - [`SignatureIndex`] turns a signature into the flat hash structure
//!   `match.c` scans (a power-of-two head table plus a chain array);
//! - [`DeltaGenerator`] slides the rolling checksum over target bytes and
//!   emits copy/literal instructions, honouring the adjacent-block
//!   preference (`want_i`), false-alarm handling, and chunked literal
//!   flushing of the C implementation;
//! - [`apply_delta`] reconstructs the target from basis plus delta and can
//!   verify the whole-file digest;
//! - [`stream`] carries delta scripts over the `token.c` wire layout,
//!   optionally compressed per the session context.
//!
//! The matcher borrows the target, the index, and the session context for a
//! single pass and retains nothing afterwards; every artifact it produces is
//! plain owned data.

mod error;
mod generator;
mod index;
mod patch;
mod script;
pub mod stream;

pub use error::{ApplyError, MatchError};
pub use generator::{generate_delta, DeltaGenerator};
pub use index::SignatureIndex;
pub use patch::{apply_delta, apply_delta_verified};
pub use script::{DeltaScript, DeltaStats, DeltaToken};
