#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Protocol plumbing for the deltasync delta-transfer engine.
//!
//! The crate covers the negotiation and framing primitives the delta engine
//! needs to stay byte-compatible with rsync protocol versions 20 through 32:
//!
//! - [`ProtocolVersion`] and [`negotiate_version`] implement the version
//!   agreement rule and the feature cut-overs derived from it.
//! - [`SessionContext`] carries the immutable per-session parameters (seed,
//!   checksum kind, compression choice, memory cap).
//! - [`varint`] ports the `io.c` integer codecs: plain 4-byte little-endian
//!   integers, the variable-length form used by protocols 27 and newer, and
//!   the legacy 64-bit dual encoding.
//! - [`wire`] implements the sum-head and token-stream layouts from `io.c`
//!   and `token.c`.
//!
//! The crate performs no I/O of its own beyond the `Read`/`Write` objects
//! callers hand to the codecs, and it never logs; errors are surfaced as
//! typed values for callers to format.

pub mod checksum;
mod context;
mod error;
mod negotiation;
pub mod varint;
mod version;
pub mod wire;

pub use checksum::ChecksumKind;
pub use context::SessionContext;
pub use error::{ConfigError, NegotiationError, WireError};
pub use negotiation::{negotiate_checksum, negotiate_version};
pub use version::ProtocolVersion;
