#![no_main]
use libfuzzer_sys::fuzz_target;
use mobitext::palmdoc;

fuzz_target!(|data: &[u8]| {
    let packed = palmdoc::compress_to_vec(data);
    assert!(packed.len() <= palmdoc::max_compressed_size(data.len()));
    let unpacked = palmdoc::decompress_to_vec(&packed, data.len()).unwrap();
    assert_eq!(unpacked, data);
});
