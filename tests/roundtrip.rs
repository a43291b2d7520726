use lzf_compression::raw::{self, Corruption, HashTable, MAX_REF_LEN};
use lzf_compression::{compress, decompress, BufferError, BufferSettings};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io;
use std::thread;

/// Random bytes drawn from an alphabet of `alphabet` symbols, so smaller alphabets repeat more.
fn random_input(rng: &mut StdRng, len: usize, alphabet: u16) -> Vec<u8> {
    (0..len).map(|_| rng.gen_range(0, alphabet) as u8).collect()
}

#[test]
fn random_roundtrips() {
    let mut rng = StdRng::seed_from_u64(0x1f2e3d4c);
    for &alphabet in &[1u16, 2, 4, 16, 256] {
        for _ in 0..50 {
            let len = rng.gen_range(0, 5000);
            let input = random_input(&mut rng, len, alphabet);
            let compressed = compress(&input).unwrap();
            assert!(compressed.len() <= raw::max_compressed_len(input.len()));
            assert_eq!(decompress(&compressed).unwrap(), input);
        }
    }
}

#[test]
fn long_distances_roundtrip() {
    // repeats further apart than a back-reference can reach, and some just within reach
    let mut rng = StdRng::seed_from_u64(7);
    let mut block = vec![0u8; 8190];
    rng.fill(&mut block[..]);
    let mut input = block.clone();
    input.extend(&block);
    input.extend(&[0u8; 10]);
    input.extend(&block);

    assert_eq!(decompress(&compress(&input).unwrap()).unwrap(), input);
}

#[test]
fn mixed_data_roundtrips() {
    let mut data = vec![0u8; 1_000_000];
    StdRng::seed_from_u64(42).fill(&mut data[200_000..600_000]);
    assert_eq!(decompress(&compress(&data).unwrap()).unwrap(), data);
}

#[test]
fn output_does_not_depend_on_buffer_size() {
    let mut rng = StdRng::seed_from_u64(99);
    let input = random_input(&mut rng, 10_000, 8);
    let expected = compress(&input).unwrap();

    for &capacity in &[expected.len(), raw::max_compressed_len(input.len()), 3 * input.len()] {
        let mut output = vec![0; capacity];
        let len = raw::compress_into(&input, &mut output).unwrap();
        assert_eq!(&output[..len], expected.as_slice());
    }

    let mut table = HashTable::default();
    let mut buffer = Vec::new();
    for estimate in 0..4 {
        let len = BufferSettings::default()
            .size_estimate(estimate)
            .compress_with_table(&input, &mut table, &mut buffer)
            .unwrap();
        assert_eq!(&buffer[..len], expected.as_slice());
    }
}

#[test]
fn full_literal_run() {
    let input: Vec<u8> = (100..132).collect();
    let compressed = compress(&input).unwrap();
    assert_eq!(compressed[0], 31);
    assert_eq!(&compressed[1..], input.as_slice());
}

#[test]
fn longest_back_reference() {
    // a match always leaves at least two bytes behind it
    let input: Vec<u8> = b"abc".iter().copied().cycle().take(3 + MAX_REF_LEN + 2).collect();
    let compressed = compress(&input).unwrap();
    // "abc" as literals, then the extended form: 7 in the top bits, 255 extra, distance 3
    assert_eq!(&compressed[..7], &[2, b'a', b'b', b'c', 0xE0, 0xFF, 0x02]);
    assert_eq!(decompress(&compressed).unwrap(), input);
}

#[test]
fn overlapping_back_reference() {
    // "ab" then 4 bytes at distance 2
    assert_eq!(decompress(&[1, b'a', b'b', 0x40, 0x01]).unwrap(), b"ababab");
    assert_eq!(decompress(&compress(b"abababababababab").unwrap()).unwrap(), b"abababababababab");
}

#[test]
fn corrupt_streams_are_rejected() {
    // distance 1 with nothing written yet
    assert_eq!(
        decompress(&[0x20, 0x00]),
        Err(BufferError::CorruptStream(Corruption::InvalidBackReference))
    );
    // distance 8192 after a single literal
    assert_eq!(
        decompress(&[0, b'x', 0x3F, 0xFF]),
        Err(BufferError::CorruptStream(Corruption::InvalidBackReference))
    );
    assert_eq!(
        decompress(&[0xE0, 0x05]),
        Err(BufferError::CorruptStream(Corruption::UnexpectedEnd))
    );

    let err: io::Error = decompress(&[0x20, 0x00]).unwrap_err().into();
    assert_eq!(err.kind(), io::ErrorKind::Other);
}

#[test]
fn garbage_never_panics() {
    let mut rng = StdRng::seed_from_u64(1234);
    let settings = {
        let mut s = BufferSettings::default();
        s.max_buffer_len(1 << 20);
        s
    };
    for _ in 0..500 {
        let len = rng.gen_range(0, 200);
        let input = random_input(&mut rng, len, 256);
        let _ = settings.decompress(&input);
    }
}

#[test]
fn empty_input() {
    assert!(compress(&[]).unwrap().is_empty());
    assert!(decompress(&[]).unwrap().is_empty());
}

#[test]
fn concurrent_compression() {
    let inputs: Vec<Vec<u8>> = (0..8u64)
        .map(|seed| random_input(&mut StdRng::seed_from_u64(seed), 50_000, 4 + seed as u16))
        .collect();
    let expected: Vec<Vec<u8>> = inputs.iter().map(|input| compress(input).unwrap()).collect();

    let handles: Vec<_> = inputs
        .into_iter()
        .map(|input| {
            thread::spawn(move || {
                let mut out = Vec::new();
                for _ in 0..10 {
                    out = compress(&input).unwrap();
                    assert_eq!(decompress(&out).unwrap(), input);
                }
                out
            })
        })
        .collect();

    for (handle, expected) in handles.into_iter().zip(expected) {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
