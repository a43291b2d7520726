#![no_main]
use libfuzzer_sys::fuzz_target;
use lzf_compression::BufferSettings;

fuzz_target!(|data: &[u8]| {
    // we deliberately ignore errors here because random bytes from fuzzer
    // are not valid LZF data and so are expected to trigger non-fatal errors
    let _ = BufferSettings::default().max_buffer_len(16 << 20).decompress(data);
});
