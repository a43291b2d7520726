use fehler::throws;

use super::{BufferError, BufferSettings};
use crate::raw::{self, HashTable};

type Error = BufferError;

impl BufferSettings {
    /// Compress `input` into a freshly allocated vector of exactly the right length.
    #[throws]
    pub fn compress(&self, input: &[u8]) -> Vec<u8> {
        let mut buffer = Vec::new();
        let len = self.compress_into(input, &mut buffer)?;
        buffer.truncate(len);
        buffer
    }

    /// Compress `input` into `buffer`, growing it as needed.
    ///
    /// Returns the length of the compressed data, which is at the front of `buffer`.
    /// Anything after that is scratch space, so you can keep passing the same buffer to avoid
    /// allocations.
    #[throws]
    pub fn compress_into(&self, input: &[u8], buffer: &mut Vec<u8>) -> usize {
        self.compress_with_table(input, &mut HashTable::default(), buffer)?
    }

    /// Like [`compress_into`](Self::compress_into), but uses a hash table you own.
    ///
    /// Handy if you compress lots of small inputs on the same thread.
    #[throws]
    pub fn compress_with_table(&self, input: &[u8], table: &mut HashTable, buffer: &mut Vec<u8>) -> usize {
        if input.is_empty() {
            return 0;
        }
        self.negotiate(input.len(), buffer, |output| raw::compress_with_table(input, table, output))?
    }
}

/// Compress `input` using the default [`BufferSettings`].
#[throws]
pub fn compress(input: &[u8]) -> Vec<u8> {
    BufferSettings::default().compress(input)?
}
