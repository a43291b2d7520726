#![no_main]
use libfuzzer_sys::fuzz_target;
use lzf_compression::raw;
use lzf_compression::{compress, decompress};

fuzz_target!(|data: &[u8]| {
    let compressed = compress(data).expect("Could not compress input data");
    assert!(compressed.len() <= raw::max_compressed_len(data.len()));

    let roundtripped = decompress(&compressed).expect("Could not decompress data");
    assert!(roundtripped.as_slice() == data, "Decompression result did not match the original input");
});
