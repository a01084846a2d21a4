#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    mobitext::huffdic::fuzz_decode(data);
});
