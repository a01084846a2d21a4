#![no_main]
use libfuzzer_sys::fuzz_target;
use mobitext::palmdoc;

fuzz_target!(|data: &[u8]| {
    // Arbitrary token streams must decode or fail cleanly.
    let _ = palmdoc::decompress_to_vec(data, palmdoc::max_decompressed_size(data.len()));

    // A short fixed buffer exercises the overflow paths.
    let mut small = [0u8; 64];
    let _ = palmdoc::decompress(data, &mut small);
});
