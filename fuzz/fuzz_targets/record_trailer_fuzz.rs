#![no_main]
use libfuzzer_sys::fuzz_target;
use mobitext::engine::{self, CompressionMethod};
use mobitext::record::{self, TextTrailers};

fuzz_target!(|data: &[u8]| {
    let Some((&flags, record)) = data.split_first() else {
        return;
    };
    let trailers = TextTrailers::from_bits_retain(flags as u32);
    if let Ok((len, overlap)) = record::text_length(record, trailers) {
        assert!(len + overlap <= record.len());
    }
    let _ = engine::decode_record(CompressionMethod::PalmDoc, record, trailers, None, 4096);
});
