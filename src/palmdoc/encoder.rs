// PalmDOC compressor.
//
// Single left-to-right pass over the source with a 3-byte window:
//   1. Hash the window, walk the distance chain (nearest candidate first,
//      only a strictly longer match replaces the current best).
//   2. Space-letter pair beats any match of length <= 3.
//   3. Otherwise a match of length >= 3 becomes a back-reference.
//   4. Otherwise a plain literal, unless an escaped run is already pending.
//   5. Otherwise the byte joins the pending escaped run (flushed at 8).
//
// The token choice is part of the format's observable output; existing
// readers and writers agree on it byte for byte.

use super::match_finder::MatchFinder;
use super::{MAX_DISTANCE, MAX_LITERAL_RUN, MAX_MATCH, MIN_MATCH, is_pair_letter, is_plain_literal};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("destination too small: need {needed} bytes, have {actual}")]
    DestinationTooSmall { needed: usize, actual: usize },
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Worst-case compressed size: one length prefix per 8 escaped bytes.
#[inline]
pub const fn max_compressed_size(source_len: usize) -> usize {
    source_len
        .saturating_add(source_len / 8)
        .saturating_add(1)
}

/// Compress `source` into `destination`, returning the number of bytes written.
///
/// `destination` must hold at least [`max_compressed_size`] bytes.
pub fn compress(source: &[u8], destination: &mut [u8]) -> Result<usize, EncodeError> {
    let needed = max_compressed_size(source.len());
    if destination.len() < needed {
        return Err(EncodeError::DestinationTooSmall {
            needed,
            actual: destination.len(),
        });
    }
    Ok(compress_unchecked(source, destination))
}

/// Compress `source` into a freshly allocated buffer.
pub fn compress_to_vec(source: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; max_compressed_size(source.len())];
    let n = compress_unchecked(source, &mut out);
    out.truncate(n);
    out
}

/// `destination` is already known to be large enough.
fn compress_unchecked(source: &[u8], destination: &mut [u8]) -> usize {
    if source.is_empty() {
        return 0;
    }

    let mut enc = Encoder::new(source, destination);
    enc.run();
    log::trace!(
        "palmdoc: compressed {} bytes to {}",
        source.len(),
        enc.dst_pos
    );
    enc.dst_pos
}

// ---------------------------------------------------------------------------
// Encoder state
// ---------------------------------------------------------------------------

struct Encoder<'a> {
    src: &'a [u8],
    dst: &'a mut [u8],
    src_pos: usize,
    dst_pos: usize,
    /// Escaped bytes waiting to be flushed; they end at `src_pos`.
    pending: usize,
    s0: u8,
    s1: u8,
    s2: u8,
    finder: MatchFinder,
}

impl<'a> Encoder<'a> {
    fn new(src: &'a [u8], dst: &'a mut [u8]) -> Self {
        let s1 = src[0];
        let s2 = src.get(1).copied().unwrap_or(s1);
        Self {
            src,
            dst,
            src_pos: 0,
            dst_pos: 0,
            pending: 0,
            s0: 0,
            s1,
            s2,
            finder: MatchFinder::new(),
        }
    }

    #[inline(always)]
    fn remaining(&self) -> usize {
        self.src.len() - self.src_pos
    }

    fn run(&mut self) {
        while self.remaining() > 2 {
            self.s0 = self.s1;
            self.s1 = self.s2;
            self.s2 = self.src[self.src_pos + 2];

            let initial = self.finder.swap_head(self.s0, self.s1, self.s2, self.src_pos);
            let (best_len, best_dist) = self.longest_match(initial as usize);
            self.finder.link(self.src_pos, initial);

            if best_len <= MIN_MATCH && self.s0 == b' ' && is_pair_letter(self.s1) {
                self.flush_pending();
                self.emit(self.s1 ^ 0x80);
                self.advance();
                self.src_pos += 1;
            } else if best_len >= MIN_MATCH {
                self.flush_pending();
                self.emit(0x80 | (best_dist >> 5) as u8);
                self.emit(((best_dist << 3) as u8) | (best_len - MIN_MATCH) as u8);
                for _ in 1..best_len {
                    self.advance();
                }
                self.src_pos += 1;
            } else {
                self.literal(self.s0);
            }
        }

        while self.remaining() > 0 {
            self.s0 = self.s1;
            self.s1 = self.s2;

            if self.s0 == b' ' && self.remaining() == 2 && is_pair_letter(self.s1) {
                self.flush_pending();
                self.emit(self.s1 ^ 0x80);
                self.src_pos += 2;
                break;
            }

            self.literal(self.s0);
        }

        self.flush_pending();
    }

    /// Walk the hash chain starting `initial` bytes back from the window.
    /// Returns `(length, distance)`; length is 0 when nothing was found.
    fn longest_match(&self, initial: usize) -> (usize, usize) {
        let pos = self.src_pos;
        let max_len = self.remaining().min(MAX_MATCH);
        let current = &self.src[pos..pos + max_len];

        let mut best_len = 0;
        let mut best_dist = 0;
        let mut distance = initial;
        while distance <= MAX_DISTANCE {
            let Some(candidate) = pos.checked_sub(distance) else {
                break;
            };

            let len = self.src[candidate..candidate + max_len]
                .iter()
                .zip(current)
                .take_while(|(a, b)| a == b)
                .count();

            if best_len < len {
                best_len = len;
                best_dist = distance;
                if best_len == MAX_MATCH {
                    break;
                }
            }

            let step = self.finder.next_distance(candidate) as usize;
            if step == 0 {
                break;
            }
            distance += step;
        }

        (best_len, best_dist)
    }

    /// Slide the window one byte forward inside a token, keeping the match
    /// tables up to date for every position the token covers.
    fn advance(&mut self) {
        self.src_pos += 1;
        self.s0 = self.s1;
        self.s1 = self.s2;
        if self.remaining() > 2 {
            self.s2 = self.src[self.src_pos + 2];
            let distance = self.finder.swap_head(self.s0, self.s1, self.s2, self.src_pos);
            self.finder.link(self.src_pos, distance);
        }
    }

    fn literal(&mut self, b: u8) {
        if self.pending == 0 && is_plain_literal(b) {
            self.emit(b);
            self.src_pos += 1;
        } else {
            self.pending += 1;
            self.src_pos += 1;
            if self.pending == MAX_LITERAL_RUN {
                self.flush_pending();
            }
        }
    }

    fn flush_pending(&mut self) {
        if self.pending == 0 {
            return;
        }
        let start = self.src_pos - self.pending;
        self.emit(self.pending as u8);
        let end = self.dst_pos + self.pending;
        self.dst[self.dst_pos..end].copy_from_slice(&self.src[start..self.src_pos]);
        self.dst_pos = end;
        self.pending = 0;
    }

    #[inline(always)]
    fn emit(&mut self, b: u8) {
        self.dst[self.dst_pos] = b;
        self.dst_pos += 1;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
