//! Buffer management around the raw codec.
//!
//! The raw format has no length prefix, so neither side knows up front how large the output
//! will be. These wrappers guess (twice the input length by default), and whenever the raw
//! codec reports that the output didn't fit they double the buffer and run the whole call
//! again. The codec is deterministic, so retrying is safe and always yields the same bytes.
//!
//! The buffer stops growing at a configurable maximum size.

mod compression;
mod decompression;

pub use compression::*;
pub use decompression::*;

use std::cmp;
use std::io::{self, ErrorKind};
use fehler::{throw, throws};
use thiserror::Error;
use tracing::{debug, trace};

use crate::raw::{self, Corruption};

/// Initial output buffer size relative to the input size.
const BUFFER_SIZE_ESTIMATE: usize = 2;
/// Default upper limit for the output buffer: 1 GiB.
const MAX_BUFFER_LEN: usize = 1 << 30;

/// Errors of the buffer-managing compression and decompression functions.
#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
pub enum BufferError {
    /// The compressed input is not a valid token stream.
    #[error("the compressed data is corrupt: {0}")]
    CorruptStream(#[from] Corruption),
    /// The output did not fit even into a buffer of the maximum allowed size.
    #[error("the output would need a buffer larger than the limit of {limit} bytes")]
    BufferLimitExceeded { limit: usize },
    /// The stream decodes to a different length than the one you asked for.
    #[error("the compressed data does not decompress to exactly {expected} bytes")]
    LengthMismatch { expected: usize },
}
type Error = BufferError; // do it this way for better docs

impl From<Error> for io::Error {
    fn from(e: Error) -> io::Error {
        io::Error::new(ErrorKind::Other, e)
    }
}

/// A builder-style struct that configures how output buffers are sized.
///
/// Create it using `Default::default()`.
#[derive(Clone, Debug)]
pub struct BufferSettings {
    size_estimate: usize,
    max_buffer_len: usize,
}
impl Default for BufferSettings {
    fn default() -> Self {
        Self {
            size_estimate: BUFFER_SIZE_ESTIMATE,
            max_buffer_len: MAX_BUFFER_LEN,
        }
    }
}
impl BufferSettings {
    /// The first attempt uses a buffer of `v` times the input length.
    ///
    /// For compression, anything from 2 upwards always succeeds on the first try.
    /// Decompression usually needs more room, but a large estimate wastes memory.
    ///
    /// The default is 2.
    pub fn size_estimate(&mut self, v: usize) -> &mut Self {
        self.size_estimate = v;
        self
    }

    /// The buffer never grows beyond `v` bytes. If the output still doesn't fit,
    /// the call fails with [`BufferError::BufferLimitExceeded`].
    ///
    /// The default is 1 GiB.
    pub fn max_buffer_len(&mut self, v: usize) -> &mut Self {
        self.max_buffer_len = v;
        self
    }

    /// Run `attempt` on `buffer`, doubling the buffer until the output fits.
    ///
    /// Returns the number of bytes `attempt` produced, which are at the front of `buffer`.
    #[throws]
    fn negotiate<F>(&self, input_len: usize, buffer: &mut Vec<u8>, mut attempt: F) -> usize
    where
        F: FnMut(&mut [u8]) -> Result<usize, raw::Error>,
    {
        let guess = input_len.saturating_mul(self.size_estimate).max(1);
        let mut capacity = cmp::min(guess, self.max_buffer_len);

        loop {
            if buffer.len() < capacity {
                buffer.resize(capacity, 0);
            }

            // a larger caller buffer is only used up to the current capacity
            match attempt(&mut buffer[..capacity]) {
                Ok(len) => break len,
                Err(raw::Error::CorruptStream(corruption)) => {
                    debug!(%corruption, input_len, "rejecting corrupt stream");
                    throw!(corruption);
                }
                Err(raw::Error::OutputTooSmall) => {
                    let tried = capacity;
                    if tried >= self.max_buffer_len {
                        debug!(input_len, limit = self.max_buffer_len, "output buffer limit reached");
                        throw!(Error::BufferLimitExceeded { limit: self.max_buffer_len });
                    }
                    capacity = cmp::min(tried.saturating_mul(2), self.max_buffer_len);
                    trace!(tried, capacity, "output buffer too small, growing");
                }
            }
        }
    }
}
