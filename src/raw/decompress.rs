//! LZF decompression.

use std::io::{self, Cursor, Read};
use byteorder::ReadBytesExt;
use fehler::{throw, throws};

use super::{Corruption, Error, EXTENDED_LEN, MAX_LITERAL_LEN, MIN_REF_LEN};

fn truncated(_: io::Error) -> Error {
    Corruption::UnexpectedEnd.into()
}

/// Decompress the token stream `input` into `output`, returning the number of bytes produced.
///
/// Fails with [`Error::OutputTooSmall`] if `output` can't hold the result (retrying with a
/// bigger buffer is fine) or with [`Error::CorruptStream`] if `input` is not a valid stream.
/// A corrupt stream is reported as such no matter how large `output` is.
#[throws]
pub fn decompress_into(input: &[u8], output: &mut [u8]) -> usize {
    let mut reader = Cursor::new(input);
    let mut pos = 0;
    loop {
        let control = match reader.read_u8() {
            Ok(x) => x,
            _ => break,
        };

        if usize::from(control) < MAX_LITERAL_LEN {
            let len = usize::from(control) + 1;
            if input.len() - (reader.position() as usize) < len {
                throw!(Corruption::UnexpectedEnd);
            }
            let target = output.get_mut(pos..pos + len).ok_or(Error::OutputTooSmall)?;
            reader.read_exact(target).map_err(truncated)?;
            pos += len;
        } else {
            let mut len = usize::from(control >> 5);
            if len == EXTENDED_LEN {
                len += usize::from(reader.read_u8().map_err(truncated)?);
            }
            let offset_low = reader.read_u8().map_err(truncated)?;
            let distance = ((usize::from(control & 0x1F) << 8) | usize::from(offset_low)) + 1;

            let len = len + MIN_REF_LEN;
            copy_overlapping(output, pos, distance, len)?;
            pos += len;
        }
    }
    pos
}

/// Copy `len` bytes starting `distance` bytes before `pos` to `pos`.
///
/// If `distance < len` the source runs into the bytes being written, which repeats the
/// pattern. That only works when copying forward one byte at a time.
#[throws]
fn copy_overlapping(output: &mut [u8], pos: usize, distance: usize, len: usize) {
    let start = match pos.checked_sub(distance) {
        Some(start) => start,
        None => throw!(Corruption::InvalidBackReference),
    };
    if output.len() - pos < len {
        throw!(Error::OutputTooSmall);
    }

    if distance >= len {
        // fastpath: nonoverlapping
        let (head, tail) = output.split_at_mut(pos);
        tail[..len].copy_from_slice(&head[start..start + len]);
    } else {
        for i in 0..len {
            output[pos + i] = output[start + i];
        }
    }
}
