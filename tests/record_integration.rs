// Integration tests for text records: chunking, trailers and decoding
// through the engine.

use mobitext::engine::{self, CompressionMethod};
use mobitext::palmdoc;
use mobitext::record::{self, DEFAULT_RECORD_SIZE, RecordOptions, TextTrailers};

/// 17 bytes per repeat, so record boundaries drift through the pattern and
/// some of them split the three-byte dash.
fn book_text() -> Vec<u8> {
    "Ünïcödé — x".repeat(1000).into_bytes()
}

fn decode_all(records: &[Vec<u8>], trailers: TextTrailers) -> Vec<u8> {
    let mut out = Vec::new();
    for r in records {
        let chunk = engine::decode_record(
            CompressionMethod::PalmDoc,
            r,
            trailers,
            None,
            DEFAULT_RECORD_SIZE,
        )
        .unwrap();
        out.extend_from_slice(&chunk);
    }
    out
}

#[test]
fn records_cover_text_in_fixed_chunks() {
    let text = book_text();
    let opts = RecordOptions::default();
    let records = record::compress_text(&text, &opts);
    assert_eq!(records.len(), text.len().div_ceil(DEFAULT_RECORD_SIZE));

    for (i, r) in records.iter().enumerate() {
        let (len, _) = record::text_length(r, TextTrailers::MULTIBYTE).unwrap();
        let chunk = palmdoc::decompress_to_vec(&r[..len], DEFAULT_RECORD_SIZE).unwrap();
        let start = i * DEFAULT_RECORD_SIZE;
        let end = (start + DEFAULT_RECORD_SIZE).min(text.len());
        assert_eq!(chunk, &text[start..end], "record {i}");
    }
    assert_eq!(decode_all(&records, TextTrailers::MULTIBYTE), text);
}

#[test]
fn multibyte_trailer_completes_split_characters() {
    let text = book_text();
    let records = record::compress_text(&text, &RecordOptions::default());

    // 12288 lands on the last byte of an em dash (E2 80 94).
    let (len, overlap) = record::text_length(&records[2], TextTrailers::MULTIBYTE).unwrap();
    assert_eq!(overlap, 1);
    assert_eq!(records[2][len..len + overlap], [0x94]);
    assert_eq!(*records[2].last().unwrap(), 0x01);

    for (i, r) in records.iter().enumerate() {
        let (len, overlap) = record::text_length(r, TextTrailers::MULTIBYTE).unwrap();
        let end = ((i + 1) * DEFAULT_RECORD_SIZE).min(text.len());
        assert_eq!(&r[len..len + overlap], record::multibyte_overlap(&text, end));
    }
}

#[test]
fn extra_trailing_entries_are_skipped() {
    let text = book_text();
    let mut records = record::compress_text(&text, &RecordOptions::default());
    for r in &mut records {
        r.extend_from_slice(&[0xAA, 0xBB, 0x83]);
    }
    let flags = TextTrailers::MULTIBYTE | TextTrailers::UNKNOWN1;
    assert_eq!(decode_all(&records, flags), text);
}

#[test]
fn records_without_trailer() {
    let text = book_text();
    let opts = RecordOptions {
        record_size: 1000,
        multibyte_trailer: false,
    };
    let records = record::compress_text(&text, &opts);
    assert_eq!(records.len(), 17);

    let mut out = Vec::new();
    for r in &records {
        let chunk =
            engine::decode_record(CompressionMethod::PalmDoc, r, TextTrailers::empty(), None, 1000)
                .unwrap();
        assert!(chunk.len() <= 1000);
        out.extend_from_slice(&chunk);
    }
    assert_eq!(out, text);
}

#[test]
fn empty_text_has_no_records() {
    assert!(record::compress_text(&[], &RecordOptions::default()).is_empty());
}

#[test]
fn uncompressed_records_roundtrip() {
    let text = book_text();
    let mut out = Vec::new();
    for (start, end) in record::split_points(text.len(), DEFAULT_RECORD_SIZE) {
        let enc = engine::encode_text(CompressionMethod::Uncompressed, &text[start..end]).unwrap();
        let dec =
            engine::decode_text(CompressionMethod::Uncompressed, &enc, None, DEFAULT_RECORD_SIZE)
                .unwrap();
        out.extend_from_slice(&dec);
    }
    assert_eq!(out, text);
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_records_match_sequential() {
    let text = book_text();
    let opts = RecordOptions::default();
    let sequential = record::compress_text(&text, &opts);
    let parallel = record::compress_text_parallel(&text, &opts);
    assert_eq!(parallel, sequential);
    assert_eq!(decode_all(&parallel, TextTrailers::MULTIBYTE), text);
}
