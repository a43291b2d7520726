//! The raw LZF token format.
//!
//! This is the bare codec: a stream of literal runs and back-references without any header,
//! length prefix or checksum. The caller has to supply an output buffer that is large enough
//! and has to remember the original length itself if it wants to store the stream somewhere.
//! See [`crate::buffered`] for a wrapper that takes care of sizing the output buffer.
//!
//! Every token starts with a control byte:
//!
//! * `000LLLLL` followed by `L + 1` literal bytes.
//! * `LLLooooo oooooooo` for a back-reference of `L + 2` bytes (`L` in `1..=6`).
//! * `111ooooo LLLLLLLL oooooooo` for a back-reference of `L + 9` bytes.
//!
//! The offset field stores `distance - 1`.

mod compress;
mod decompress;

pub use compress::*;
pub use decompress::*;

use thiserror::Error;

/// A literal run holds at most this many bytes.
pub const MAX_LITERAL_LEN: usize = 1 << 5;
/// Back-references can reach at most this many bytes back.
pub const MAX_OFFSET: usize = 1 << 13;
/// Longest back-reference the format can express.
pub const MAX_REF_LEN: usize = (1 << 8) + (1 << 3);

/// Number of bits in a hash table slot index.
pub const HASH_LOG: u32 = 14;
/// Number of slots in the match finder's hash table.
pub const HASH_SIZE: usize = 1 << HASH_LOG;

/// Shortest back-reference.
const MIN_REF_LEN: usize = 2;
/// Back-reference lengths at or above this (after subtracting `MIN_REF_LEN`) need an extra length byte.
const EXTENDED_LEN: usize = 7;

/// Why a token stream was rejected.
#[derive(Error, Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Corruption {
    /// Expected more bytes, but found none.
    /// Either your input was truncated or you're trying to decompress garbage.
    #[error("the token stream ends in the middle of a token")]
    UnexpectedEnd,
    /// A back-reference points before the start of the output.
    #[error("a back-reference points before the start of the output")]
    InvalidBackReference,
}

/// Errors of the raw codec.
#[derive(Error, Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Error {
    /// The output buffer you gave me is too small.
    ///
    /// Nothing written to it is meaningful; try again with a bigger buffer.
    #[error("the output buffer is too small")]
    OutputTooSmall,
    /// The encoded input is not a valid token stream.
    #[error("corrupt token stream: {0}")]
    CorruptStream(#[from] Corruption),
}
