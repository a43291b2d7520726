//! The compression algorithm.
//!
//! We make use of a hash table to find duplicates. Every 3-byte window of the input is hashed
//! into a fixed table of 2^14 slots remembering where that window was seen last. This gives a
//! modest compression ratio at a very high speed, and the memory usage is fixed no matter how
//! large the input is.

use std::cmp;
use std::io::{self, Write};
use std::mem;
use byteorder::WriteBytesExt;
use fehler::{throw, throws};

use super::{Error, EXTENDED_LEN, HASH_LOG, HASH_SIZE, MAX_LITERAL_LEN, MAX_OFFSET, MAX_REF_LEN, MIN_REF_LEN};

/// A match must cover at least one full window.
const WINDOW_LEN: usize = 3;

/// Slot value for "never seen".
const EMPTY: usize = usize::MAX;

/// Scratch space of the match finder.
///
/// Each slot holds the most recent input position whose 3-byte window hashed to that slot.
/// Entries may be stale or belong to a colliding window, so a candidate is never trusted
/// before its bytes have been compared.
///
/// A table is only ever used by one compression at a time (it is borrowed mutably for the
/// whole call), so there is nothing to lock. Keep one per worker if you want to avoid the
/// allocation.
#[derive(Clone)]
pub struct HashTable {
    slots: Box<[usize]>,
}
impl Default for HashTable {
    fn default() -> Self {
        HashTable { slots: vec![EMPTY; HASH_SIZE].into_boxed_slice() }
    }
}
impl HashTable {
    /// Forget every position.
    pub fn reset(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = EMPTY;
        }
    }

    /// Remember `position` for `window` and return the position previously stored in its slot.
    fn replace(&mut self, window: u32, position: usize) -> Option<usize> {
        match mem::replace(&mut self.slots[slot_for(window)], position) {
            EMPTY => None,
            previous => Some(previous),
        }
    }
}

/// Start a rolling window with the two bytes at `i`.
fn window_head(input: &[u8], i: usize) -> u32 {
    (u32::from(input[i]) << 8) | u32::from(input[i + 1])
}

/// Shift the byte at `i + 2` into the window, turning it into the window at `i`.
fn window_next(window: u32, input: &[u8], i: usize) -> u32 {
    ((window << 8) | u32::from(input[i + 2])) & 0x00FF_FFFF
}

fn slot_for(window: u32) -> usize {
    // the shift amount is derived from the window itself and wraps around modulo 32
    let shift = (3 * 8 - HASH_LOG).wrapping_sub(window.wrapping_mul(5));
    ((window ^ (window << 5)).wrapping_shr(shift) as usize) & (HASH_SIZE - 1)
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct BackReference {
    /// The number of bytes before our cursor, where the duplicate starts.
    distance: usize,
    /// Total number of bytes covered, at least `WINDOW_LEN`.
    len: usize,
}

impl BackReference {
    fn encoded_len(&self) -> usize {
        if self.len - MIN_REF_LEN < EXTENDED_LEN { 2 } else { 3 }
    }
}

fn count_matching_bytes(a: &[u8], b: &[u8]) -> usize {
    const REGSIZE: usize = mem::size_of::<usize>();
    fn read_usize(b: &[u8]) -> usize {
        let mut buf = [0u8; REGSIZE];
        buf.copy_from_slice(&b[..REGSIZE]);
        usize::from_le_bytes(buf)
    }

    let mut matching_bytes = 0;
    // compare a full register at a time instead of single bytes
    for (a, b) in a.chunks_exact(REGSIZE).zip(b.chunks_exact(REGSIZE)) {
        let xor = read_usize(a) ^ read_usize(b);
        if xor == 0 {
            matching_bytes += REGSIZE;
        } else {
            // little endian load: the first differing byte is the lowest nonzero one
            matching_bytes += (xor.trailing_zeros() / 8) as usize;
            return matching_bytes;
        }
    }

    let trailing_matches = a.iter().zip(b).skip(matching_bytes).take_while(|&(a, b)| a == b).count();
    matching_bytes + trailing_matches
}

/// Check the candidate proposed by the hash table and extend it as far as possible.
fn find_match(input: &[u8], candidate: usize, cursor: usize) -> Option<BackReference> {
    let distance = cursor - candidate;
    // the match must leave two bytes behind it so the next windows can be hashed,
    // and it must be long enough that its length field is nonzero
    if distance > MAX_OFFSET || cursor + WINDOW_LEN + 1 >= input.len() {
        return None;
    }
    // hash collisions are a thing
    if input[candidate..candidate + WINDOW_LEN] != input[cursor..cursor + WINDOW_LEN] {
        return None;
    }

    let max_len = cmp::min(MAX_REF_LEN, input.len() - cursor - 2);
    let len = count_matching_bytes(&input[cursor..cursor + max_len], &input[candidate..]);
    debug_assert!(len >= WINDOW_LEN);
    Some(BackReference { distance, len })
}

#[throws(io::Error)]
fn write_literals<W: Write>(writer: &mut W, literals: &[u8]) {
    debug_assert!((1..=MAX_LITERAL_LEN).contains(&literals.len()));
    writer.write_u8((literals.len() - 1) as u8)?;
    writer.write_all(literals)?;
}

#[throws(io::Error)]
fn write_back_reference<W: Write>(writer: &mut W, reference: BackReference) {
    let len = reference.len - MIN_REF_LEN;
    let offset = reference.distance - 1;
    let offset_high = (offset >> 8) as u8;

    if len < EXTENDED_LEN {
        writer.write_u8(((len as u8) << 5) | offset_high)?;
    } else {
        writer.write_u8(((EXTENDED_LEN as u8) << 5) | offset_high)?;
        writer.write_u8((len - EXTENDED_LEN) as u8)?;
    }
    writer.write_u8(offset as u8)?;
}

/// Worst-case size of the encoding of `input_len` bytes.
///
/// That is the size of an all-literal stream: one control byte per 32 bytes.
/// Back-references never cost more than the bytes they replace.
pub const fn max_compressed_len(input_len: usize) -> usize {
    input_len + (input_len + MAX_LITERAL_LEN - 1) / MAX_LITERAL_LEN
}

/// Compress `input` into `output`, returning the number of bytes written.
///
/// Allocates a fresh [`HashTable`] for this call.
/// Fails with [`Error::OutputTooSmall`] if the result does not fit, in which case the
/// contents of `output` are garbage.
#[throws]
pub fn compress_into(input: &[u8], output: &mut [u8]) -> usize {
    compress_with_table(input, &mut HashTable::default(), output)?
}

/// Like [`compress_into`], but uses a table you own instead of allocating one.
///
/// The table is reset first, so the result is exactly the same.
#[throws]
pub fn compress_with_table(input: &[u8], table: &mut HashTable, output: &mut [u8]) -> usize {
    let capacity = output.len();
    let mut writer = NoPartialWrites(output);
    encode(input, table, &mut writer)?;
    capacity - writer.0.len()
}

#[throws]
fn encode(input: &[u8], table: &mut HashTable, writer: &mut NoPartialWrites) {
    let mut literal_start = 0;
    let mut cursor = 0;

    // anything shorter than a window can't be hashed, let alone matched
    if input.len() >= WINDOW_LEN {
        table.reset();

        let mut window = window_head(input, 0);
        while cursor + 2 < input.len() {
            window = window_next(window, input, cursor);
            let candidate = table.replace(window, cursor);

            if let Some(reference) = candidate.and_then(|c| find_match(input, c, cursor)) {
                let literals = &input[literal_start..cursor];
                let literal_cost = if literals.is_empty() { 0 } else { 1 + literals.len() };
                writer.reserve(literal_cost + reference.encoded_len())?;
                if !literals.is_empty() {
                    write_literals(writer, literals).map_err(overflow)?;
                }
                write_back_reference(writer, reference).map_err(overflow)?;

                cursor += reference.len;
                literal_start = cursor;

                // only hash the last two windows of the match, skipping the rest
                window = window_head(input, cursor - 2);
                for position in cursor - 2..cursor {
                    window = window_next(window, input, position);
                    table.replace(window, position);
                }
                continue;
            }

            cursor += 1;
            if cursor - literal_start == MAX_LITERAL_LEN {
                writer.reserve(1 + MAX_LITERAL_LEN)?;
                write_literals(writer, &input[literal_start..cursor]).map_err(overflow)?;
                literal_start = cursor;
            }
        }
    }

    // the tail is too short to start a match
    for literals in input[literal_start..].chunks(MAX_LITERAL_LEN) {
        writer.reserve(1 + literals.len())?;
        write_literals(writer, literals).map_err(overflow)?;
    }
}

fn overflow(_: io::Error) -> Error {
    Error::OutputTooSmall
}

/// Writes into a fixed slice and refuses any write that does not fit completely.
///
/// Partial writes would be pointless here: if the output doesn't fit, the whole buffer is
/// thrown away anyway.
struct NoPartialWrites<'a>(&'a mut [u8]);
impl<'a> NoPartialWrites<'a> {
    #[throws]
    fn reserve(&self, len: usize) {
        if self.0.len() < len {
            throw!(Error::OutputTooSmall);
        }
    }
}
impl<'a> Write for NoPartialWrites<'a> {
    #[inline]
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if self.0.len() < data.len() {
            return Err(io::ErrorKind::WriteZero.into());
        }

        let (a, b) = mem::take(&mut self.0).split_at_mut(data.len());
        a.copy_from_slice(data);
        self.0 = b;
        Ok(data.len())
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
