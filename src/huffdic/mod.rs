// HUFF/CDIC dictionary decompression (legacy MOBI text encoding).
//
// The container parser hands over ready-made tables and dictionary shards;
// this module only decodes.
//
// - `tables`     — lookup + code-range tables, parsed from big-endian bytes
// - `dictionary` — dictionary entries and index-shift addressed shards
// - `decoder`    — bit-window decoder with bounded recursive expansion

pub mod decoder;
pub mod dictionary;
pub mod tables;

pub use decoder::{DecodeError, HuffDicDecoder, MAX_DEPTH};
pub use dictionary::{DictEntry, DictionaryShard};
pub use tables::{CodeRange, HuffTables, LutEntry, TableError};

/// Build a decoder from raw bytes and decode the rest of `data` with it.
///
/// Layout: packed lookup table, packed code ranges, index shift byte, entry
/// count byte, that many packed dictionary entries, then the input stream.
/// Malformed tables end the run early; decode errors are discarded.
#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_decode(data: &[u8]) {
    let Some((head, rest)) = data.split_at_checked(tables::LUT_BYTES + tables::CODE_RANGE_BYTES)
    else {
        return;
    };
    let (lut, ranges) = head.split_at(tables::LUT_BYTES);
    let Ok(huff) = HuffTables::from_be_bytes(lut, ranges) else {
        return;
    };
    let [shift, count, rest @ ..] = rest else {
        return;
    };
    let index_shift = (*shift % 9) as u32;

    let mut entries = Vec::new();
    let mut rest = rest;
    for _ in 0..*count {
        let [hi, lo, body @ ..] = rest else {
            break;
        };
        let header = u16::from_be_bytes([*hi, *lo]);
        let Ok(entry) = DictEntry::from_packed(header, body) else {
            break;
        };
        rest = &body[entry.data().len()..];
        entries.push(entry);
    }

    let shards: Result<Vec<_>, _> = entries
        .chunks(1 << index_shift)
        .map(|chunk| DictionaryShard::new(index_shift, chunk.to_vec()))
        .collect();
    let Ok(shards) = shards else {
        return;
    };
    let Ok(decoder) = HuffDicDecoder::new(huff, shards) else {
        return;
    };
    let _ = decoder.decompress_to_vec(rest, 1 << 16);
}
