// Text records: fixed-size chunks of book text, compressed independently.
//
// Writing:
//   text -> chunks of `record_size` -> PalmDOC tokens
//        -> [UTF-8 continuation bytes spilling past the chunk] + [count byte]
//
// Reading:
//   record bytes -> strip trailing entries (per `TextTrailers`) -> tokens
//
// Each trailing entry other than the multibyte one ends with its own size,
// stored as a backward variable-length integer: read from the last byte
// towards the front, 7 bits per byte, stopping at a byte with bit 7 set.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::palmdoc;

/// Default uncompressed text per record.
pub const DEFAULT_RECORD_SIZE: usize = 4096;

/// Most continuation bytes a multibyte trailer can describe.
pub const MAX_MULTIBYTE_OVERLAP: usize = 15;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration for splitting and compressing book text.
#[derive(Debug, Clone)]
pub struct RecordOptions {
    /// Uncompressed bytes per record (the last record may be shorter).
    pub record_size: usize,
    /// Append the multibyte trailer to every record.
    pub multibyte_trailer: bool,
}

impl Default for RecordOptions {
    fn default() -> Self {
        Self {
            record_size: DEFAULT_RECORD_SIZE,
            multibyte_trailer: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Trailer flags
// ---------------------------------------------------------------------------

bitflags::bitflags! {
    /// Trailing entries present at the end of each text record.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextTrailers: u32 {
        const MULTIBYTE = 0x1;
        const UNKNOWN1 = 0x2;
        const UNCROSSABLE_BREAKS = 0x4;
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("invalid text trailer: {0}")]
    InvalidTrailer(&'static str),
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Byte ranges of the records a text of `text_len` bytes splits into.
pub fn split_points(text_len: usize, record_size: usize) -> impl Iterator<Item = (usize, usize)> {
    let record_size = record_size.max(1);
    (0..text_len)
        .step_by(record_size)
        .map(move |start| (start, (start + record_size).min(text_len)))
}

/// Continuation bytes immediately after `end`, completing a UTF-8 sequence
/// that the record boundary cut.
pub fn multibyte_overlap(text: &[u8], end: usize) -> &[u8] {
    let tail = text.get(end..).unwrap_or_default();
    let n = tail
        .iter()
        .take(MAX_MULTIBYTE_OVERLAP)
        .take_while(|&&b| b & 0xC0 == 0x80)
        .count();
    &tail[..n]
}

/// Compress `text[start..end]` into one record.
pub fn encode_record(text: &[u8], start: usize, end: usize, opts: &RecordOptions) -> Vec<u8> {
    let mut record = palmdoc::compress_to_vec(&text[start..end]);
    if opts.multibyte_trailer {
        let overlap = multibyte_overlap(text, end);
        record.extend_from_slice(overlap);
        record.push(overlap.len() as u8);
    }
    record
}

/// Split `text` into records and compress each one.
pub fn compress_text(text: &[u8], opts: &RecordOptions) -> Vec<Vec<u8>> {
    let records: Vec<Vec<u8>> = split_points(text.len(), opts.record_size)
        .map(|(start, end)| encode_record(text, start, end, opts))
        .collect();
    log::debug!(
        "record: {} text bytes -> {} records, {} bytes",
        text.len(),
        records.len(),
        records.iter().map(Vec::len).sum::<usize>()
    );
    records
}

/// Same output as [`compress_text`], with records compressed on the rayon
/// thread pool.
#[cfg(feature = "parallel")]
pub fn compress_text_parallel(text: &[u8], opts: &RecordOptions) -> Vec<Vec<u8>> {
    let ranges: Vec<(usize, usize)> = split_points(text.len(), opts.record_size).collect();
    ranges
        .par_iter()
        .map(|&(start, end)| encode_record(text, start, end, opts))
        .collect()
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Length of the compressed text in `record` once the trailing entries are
/// removed, plus the number of multibyte overlap bytes.
pub fn text_length(record: &[u8], trailers: TextTrailers) -> Result<(usize, usize), RecordError> {
    let mut len = record.len();

    let mut flags = trailers.bits() >> 1;
    while flags != 0 {
        if flags & 1 != 0 {
            let size = backward_size(&record[..len])?;
            if size > len {
                return Err(RecordError::InvalidTrailer("entry larger than record"));
            }
            len -= size;
        }
        flags >>= 1;
    }

    if !trailers.contains(TextTrailers::MULTIBYTE) {
        return Ok((len, 0));
    }

    let Some(last) = len.checked_sub(1) else {
        return Err(RecordError::InvalidTrailer("missing multibyte count"));
    };
    let overlap = (record[last] & 0x0F) as usize;
    if overlap > last {
        return Err(RecordError::InvalidTrailer("multibyte overlap larger than record"));
    }
    log::trace!("record: multibyte overlap of {overlap} bytes");
    Ok((last - overlap, overlap))
}

/// Decode the size stored at the end of `data`.
fn backward_size(data: &[u8]) -> Result<usize, RecordError> {
    let mut size: u32 = 0;
    let mut index = data
        .len()
        .checked_sub(1)
        .ok_or(RecordError::InvalidTrailer("empty record"))?;

    for shift in (0..32).step_by(7) {
        let b = data[index];
        size |= ((b & 0x7F) as u32) << shift;
        if b & 0x80 != 0 {
            break;
        }
        index = index
            .checked_sub(1)
            .ok_or(RecordError::InvalidTrailer("unterminated size"))?;
    }

    Ok(size as usize)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_points_cover_text() {
        let pts: Vec<_> = split_points(10, 4).collect();
        assert_eq!(pts, [(0, 4), (4, 8), (8, 10)]);
        assert_eq!(split_points(0, 4).count(), 0);
        assert_eq!(split_points(8, 4).count(), 2);
    }

    #[test]
    fn overlap_stops_at_non_continuation() {
        let text = "aé".as_bytes(); // 61 C3 A9
        assert_eq!(multibyte_overlap(text, 2), [0xA9]);
        assert_eq!(multibyte_overlap(text, 1), &[] as &[u8]);
        assert_eq!(multibyte_overlap(text, 3), &[] as &[u8]);
        assert_eq!(multibyte_overlap(text, 10), &[] as &[u8]);
    }

    #[test]
    fn overlap_is_capped() {
        let mut text = vec![b'a'];
        text.extend(std::iter::repeat_n(0x80, 20));
        assert_eq!(multibyte_overlap(&text, 1).len(), MAX_MULTIBYTE_OVERLAP);
    }

    #[test]
    fn record_trailer_layout() {
        let text = "aé".as_bytes();
        let opts = RecordOptions {
            record_size: 2,
            multibyte_trailer: true,
        };
        let records = compress_text(text, &opts);
        assert_eq!(records.len(), 2);
        // 'a', escaped 0xC3, then overlap 0xA9 and its count
        assert_eq!(records[0], [0x61, 0x01, 0xC3, 0xA9, 0x01]);
        assert_eq!(records[1], [0x01, 0xA9, 0x00]);
    }

    #[test]
    fn record_without_trailer() {
        let opts = RecordOptions {
            record_size: 4096,
            multibyte_trailer: false,
        };
        assert_eq!(compress_text(b"abc", &opts), [b"abc".to_vec()]);
    }

    #[test]
    fn strip_multibyte_trailer() {
        let record = [0x61, 0x01, 0xC3, 0xA9, 0x01];
        assert_eq!(text_length(&record, TextTrailers::MULTIBYTE), Ok((3, 1)));
        assert_eq!(text_length(&record, TextTrailers::empty()), Ok((5, 0)));
    }

    #[test]
    fn strip_sized_entries() {
        // text "hi", a 3-byte entry (size 0x83), then a 2-byte entry
        // (size 0x82).  Lower flag bits sit further towards the end.
        let record = [b'h', b'i', 0xAA, 0xBB, 0x83, 0x00, 0x82];
        let flags = TextTrailers::UNKNOWN1 | TextTrailers::UNCROSSABLE_BREAKS;
        assert_eq!(text_length(&record, flags), Ok((2, 0)));
    }

    #[test]
    fn multibyte_is_innermost() {
        // text "x", multibyte count 0, then a 2-byte sized entry.
        let record = [b'x', 0x00, 0xEE, 0x82];
        let flags = TextTrailers::MULTIBYTE | TextTrailers::UNKNOWN1;
        assert_eq!(text_length(&record, flags), Ok((1, 0)));
    }

    #[test]
    fn unknown_flags_are_sized_entries() {
        let record = [b'x', 0x81];
        let flags = TextTrailers::from_bits_retain(0x100);
        assert_eq!(text_length(&record, flags), Ok((1, 0)));
    }

    #[test]
    fn malformed_trailers() {
        assert_eq!(
            text_length(&[], TextTrailers::MULTIBYTE),
            Err(RecordError::InvalidTrailer("missing multibyte count"))
        );
        assert_eq!(
            text_length(&[0x05], TextTrailers::MULTIBYTE),
            Err(RecordError::InvalidTrailer(
                "multibyte overlap larger than record"
            ))
        );
        assert_eq!(
            text_length(&[0x90], TextTrailers::UNKNOWN1),
            Err(RecordError::InvalidTrailer("entry larger than record"))
        );
        assert_eq!(
            text_length(&[0x01, 0x02], TextTrailers::UNKNOWN1),
            Err(RecordError::InvalidTrailer("unterminated size"))
        );
        assert_eq!(
            text_length(&[], TextTrailers::UNKNOWN1),
            Err(RecordError::InvalidTrailer("empty record"))
        );
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_matches_sequential() {
        let text: Vec<u8> = "The quick brown fox jumps over the lazy dog. "
            .bytes()
            .cycle()
            .take(50_000)
            .collect();
        let opts = RecordOptions::default();
        assert_eq!(compress_text_parallel(&text, &opts), compress_text(&text, &opts));
    }
}
