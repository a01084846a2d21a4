// PalmDOC decompressor.
//
// Dispatches on each leading byte (see the table in `palmdoc/mod.rs`).
// Back-references are copied one byte at a time in increasing order so that
// a distance shorter than the length repeats the bytes it has just written.
//
// Every malformed input is reported as a `DecodeError`; the decoder never
// indexes out of bounds.

use super::{MAX_MATCH, MIN_MATCH};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("back-reference with zero distance at input offset {position}")]
    ZeroDistance { position: usize },

    #[error("back-reference distance {distance} exceeds {produced} bytes produced")]
    DistanceOutOfRange { distance: usize, produced: usize },

    #[error("escaped literal run needs {needed} bytes, {available} remain")]
    TruncatedLiteral { needed: usize, available: usize },

    #[error("back-reference truncated at end of input")]
    TruncatedCopy,

    #[error("output exceeds destination capacity of {capacity} bytes")]
    OutputOverflow { capacity: usize },
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Upper bound on the decompressed size of `compressed_len` token bytes.
///
/// A two-byte back-reference expands to at most ten bytes.
#[inline]
pub const fn max_decompressed_size(compressed_len: usize) -> usize {
    compressed_len.saturating_mul(MAX_MATCH / 2)
}

/// Decode the token stream in `source` into `destination`.
///
/// Returns the number of bytes written.
pub fn decompress(source: &[u8], destination: &mut [u8]) -> Result<usize, DecodeError> {
    let capacity = destination.len();
    let overflow = DecodeError::OutputOverflow { capacity };

    let mut sp = 0usize;
    let mut dp = 0usize;

    while sp < source.len() {
        let b = source[sp];
        sp += 1;

        match b {
            0x00 | 0x09..=0x7F => {
                *destination.get_mut(dp).ok_or(overflow.clone())? = b;
                dp += 1;
            }
            0x01..=0x08 => {
                let len = b as usize;
                let run = source
                    .get(sp..sp + len)
                    .ok_or(DecodeError::TruncatedLiteral {
                        needed: len,
                        available: source.len() - sp,
                    })?;
                destination
                    .get_mut(dp..dp + len)
                    .ok_or(overflow.clone())?
                    .copy_from_slice(run);
                sp += len;
                dp += len;
            }
            0x80..=0xBF => {
                let lo = *source.get(sp).ok_or(DecodeError::TruncatedCopy)?;
                sp += 1;

                let distance = (((b as usize) << 5) | (lo as usize >> 3)) & 0x7FF;
                let len = (lo & 0x07) as usize + MIN_MATCH;
                if distance == 0 {
                    return Err(DecodeError::ZeroDistance { position: sp - 2 });
                }
                if distance > dp {
                    return Err(DecodeError::DistanceOutOfRange {
                        distance,
                        produced: dp,
                    });
                }
                if dp + len > capacity {
                    return Err(overflow);
                }

                // Overlapping copy: must go forward byte by byte.
                for i in dp..dp + len {
                    destination[i] = destination[i - distance];
                }
                dp += len;
            }
            0xC0..=0xFF => {
                let pair = destination.get_mut(dp..dp + 2).ok_or(overflow.clone())?;
                pair[0] = b' ';
                pair[1] = b ^ 0x80;
                dp += 2;
            }
        }
    }

    Ok(dp)
}

/// Decode into a new buffer of at most `capacity` bytes.
pub fn decompress_to_vec(source: &[u8], capacity: usize) -> Result<Vec<u8>, DecodeError> {
    let mut out = vec![0u8; capacity];
    let n = decompress(source, &mut out)?;
    out.truncate(n);
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(source: &[u8]) -> Result<Vec<u8>, DecodeError> {
        decompress_to_vec(source, max_decompressed_size(source.len()))
    }

    #[test]
    fn literal_tokens() {
        assert_eq!(decode(&[0x00, 0x09, 0x41, 0x7F]).unwrap(), [0x00, 0x09, 0x41, 0x7F]);
    }

    #[test]
    fn escaped_run() {
        assert_eq!(decode(&[0x03, 0x01, 0xFF, 0x80]).unwrap(), [0x01, 0xFF, 0x80]);
    }

    #[test]
    fn space_letter_pair() {
        assert_eq!(decode(&[0xC1, 0xFF]).unwrap(), b" A \x7F");
    }

    #[test]
    fn overlapping_back_reference() {
        // distance 1, length 5
        assert_eq!(decode(&[0x41, 0x80, 0x0A]).unwrap(), [0x41; 6]);
    }

    #[test]
    fn max_length_back_reference() {
        assert_eq!(decode(&[0x00, 0x80, 0x0F]).unwrap(), [0x00; 11]);
    }

    #[test]
    fn zero_distance_rejected() {
        assert_eq!(
            decode(&[0x41, 0x80, 0x00]),
            Err(DecodeError::ZeroDistance { position: 1 })
        );
    }

    #[test]
    fn distance_past_start_rejected() {
        // distance 2 after one byte of output
        assert_eq!(
            decode(&[0x41, 0x80, 0x10]),
            Err(DecodeError::DistanceOutOfRange {
                distance: 2,
                produced: 1
            })
        );
    }

    #[test]
    fn truncated_run_rejected() {
        assert_eq!(
            decode(&[0x04, 0x01, 0x02]),
            Err(DecodeError::TruncatedLiteral {
                needed: 4,
                available: 2
            })
        );
    }

    #[test]
    fn truncated_back_reference_rejected() {
        assert_eq!(decode(&[0x41, 0x80]), Err(DecodeError::TruncatedCopy));
    }

    #[test]
    fn capacity_enforced() {
        let mut dst = [0u8; 3];
        assert_eq!(
            decompress(&[0x41, 0x42, 0xC1], &mut dst),
            Err(DecodeError::OutputOverflow { capacity: 3 })
        );
        assert_eq!(
            decompress(&[0x41, 0x80, 0x0A], &mut dst),
            Err(DecodeError::OutputOverflow { capacity: 3 })
        );
        assert_eq!(
            decompress(&[0x02, 0x01, 0x01, 0x41, 0x42], &mut dst),
            Err(DecodeError::OutputOverflow { capacity: 3 })
        );
    }

    #[test]
    fn exact_capacity_is_enough() {
        let mut dst = [0u8; 6];
        assert_eq!(decompress(&[0x41, 0x80, 0x0A], &mut dst), Ok(6));
    }

    #[test]
    fn empty_input() {
        let mut dst = [0u8; 0];
        assert_eq!(decompress(&[], &mut dst), Ok(0));
    }
}
