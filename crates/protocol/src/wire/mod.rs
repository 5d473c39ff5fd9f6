//! Wire layouts for the delta-transfer path.
//!
//! The submodules mirror the framing used by `io.c` and `token.c`: the
//! signature sum head and the copy/literal token stream. Both layouts are
//! byte-compatible with the agreed protocol version across the full
//! supported range.

mod sum_head;
mod token;

pub use sum_head::{read_sum_head, write_sum_head, SumHead, SHORT_SUM_LENGTH};
pub use token::{
    read_literal_payload, read_token, write_token_block_match, write_token_end,
    write_token_literal, Token, CHUNK_SIZE,
};
