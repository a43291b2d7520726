//! Pure Rust implementation of the LZF compression format.
//!
//! LZF is a tiny LZ77 variant: a fixed 16K-entry hash table proposes matches, and the
//! output is a sequence of literal runs and short back-references. It compresses worse than
//! pretty much anything else, but it is very fast in both directions.
//!
//! Most users want [`compress`] and [`decompress`], which take care of sizing the output.
//! The [`raw`] module exposes the codec itself, which writes into buffers you provide.
//!
//! ```
//! let input = b"to live or not to live, that is the question: to live or not to live";
//! let compressed = lzf_compression::compress(input).unwrap();
//! assert!(compressed.len() < input.len());
//! assert_eq!(lzf_compression::decompress(&compressed).unwrap(), input);
//! ```

#![forbid(unsafe_code)]

pub mod raw;
pub mod buffered;

pub use buffered::{compress, decompress, BufferError, BufferSettings};
