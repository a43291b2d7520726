use fehler::{throw, throws};

use super::{BufferError, BufferSettings};
use crate::raw;

type Error = BufferError;

impl BufferSettings {
    /// Decompress `input` into a freshly allocated vector of exactly the right length.
    #[throws]
    pub fn decompress(&self, input: &[u8]) -> Vec<u8> {
        let mut buffer = Vec::new();
        let len = self.decompress_into(input, &mut buffer)?;
        buffer.truncate(len);
        buffer
    }

    /// Decompress `input` into `buffer`, growing it as needed.
    ///
    /// Returns the length of the decompressed data, which is at the front of `buffer`.
    #[throws]
    pub fn decompress_into(&self, input: &[u8], buffer: &mut Vec<u8>) -> usize {
        if input.is_empty() {
            return 0;
        }
        self.negotiate(input.len(), buffer, |output| raw::decompress_into(input, output))?
    }

    /// Decompress `input` if you know exactly how long the result is.
    ///
    /// The raw format doesn't store the length, so if you stored it yourself this saves
    /// all the guessing: there is exactly one attempt with a buffer of `len` bytes.
    #[throws]
    pub fn decompress_exact(&self, input: &[u8], len: usize) -> Vec<u8> {
        if len > self.max_buffer_len {
            throw!(Error::BufferLimitExceeded { limit: self.max_buffer_len });
        }

        let mut buffer = vec![0; len];
        match raw::decompress_into(input, &mut buffer) {
            Ok(actual) if actual == len => buffer,
            Ok(_) | Err(raw::Error::OutputTooSmall) => throw!(Error::LengthMismatch { expected: len }),
            Err(raw::Error::CorruptStream(corruption)) => throw!(corruption),
        }
    }
}

/// Decompress `input` using the default [`BufferSettings`].
#[throws]
pub fn decompress(input: &[u8]) -> Vec<u8> {
    BufferSettings::default().decompress(input)?
}
