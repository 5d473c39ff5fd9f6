#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Compression adapters for the deltasync token stream.
//!
//! Protocol versions 30 and newer may negotiate compression for the delta
//! token stream; zlib is available from protocol 30 and Zstandard is an
//! opt-in from protocol 31. The helpers here are transparent one-shot codecs:
//! the protocol layer encodes the token stream into a byte buffer and routes
//! it through [`CompressionAlgorithm::compress`] /
//! [`CompressionAlgorithm::decompress`] as a single framed stream. Session
//! multiplexing is out of scope and handled by callers.
//!
//! Errors from the underlying zlib and zstd implementations are surfaced as
//! [`std::io::Error`] values; the wire layer maps decode failures onto its
//! malformed-input error kind.

mod algorithm;
pub mod zlib;
pub mod zstd;

pub use algorithm::CompressionAlgorithm;
pub use zlib::CompressionLevel;
