// HUFF/CDIC decompressor.
//
// Decoding loop over a 32-bit big-endian bit window:
//   1. Refill byte by byte while at most 24 bits are buffered.
//   2. Index the lookup table with the top 8 bits.
//   3. Non-terminal entries extend the code one bit at a time until the code
//      reaches that length's `min_code`.
//   4. `index = max_code - code`; stop when fewer bits remain than the code
//      needs (that is the end of the input).
//   5. Literal entries are copied out; nested entries are decoded in turn,
//      one recursion level deeper.
//
// The decoder holds only immutable tables, so one instance can serve any
// number of threads.

use super::dictionary::{DictEntry, DictionaryShard};
use super::tables::{HuffTables, TableError};

/// Nesting depth at which dictionary expansion is considered cyclic.
pub const MAX_DEPTH: usize = 32;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("lookup table entry has zero code length")]
    InvalidCode,

    #[error("code exceeds 32 bits")]
    CodeTooLong,

    #[error("dictionary expansion reached depth {depth}")]
    RecursionLimit { depth: usize },

    #[error("dictionary index {index} has no entry")]
    MissingEntry { index: u32 },

    #[error("output exceeds destination capacity of {capacity} bytes")]
    OutputOverflow { capacity: usize },
}

// ---------------------------------------------------------------------------
// Output sinks
// ---------------------------------------------------------------------------

/// Destination for expanded dictionary text.
trait Sink {
    fn put(&mut self, bytes: &[u8]) -> Result<(), DecodeError>;
}

/// Fixed-size caller buffer.
struct SliceSink<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl Sink for SliceSink<'_> {
    #[inline]
    fn put(&mut self, bytes: &[u8]) -> Result<(), DecodeError> {
        let end = self.pos + bytes.len();
        let capacity = self.buf.len();
        self.buf
            .get_mut(self.pos..end)
            .ok_or(DecodeError::OutputOverflow { capacity })?
            .copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }
}

/// Growable buffer with a hard limit.
struct VecSink<'a> {
    buf: &'a mut Vec<u8>,
    limit: usize,
}

impl Sink for VecSink<'_> {
    #[inline]
    fn put(&mut self, bytes: &[u8]) -> Result<(), DecodeError> {
        if self.buf.len() + bytes.len() > self.limit {
            return Err(DecodeError::OutputOverflow {
                capacity: self.limit,
            });
        }
        self.buf.extend_from_slice(bytes);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Dictionary-backed Huffman decoder.
#[derive(Debug, Clone)]
pub struct HuffDicDecoder {
    tables: HuffTables,
    index_shift: u32,
    index_mask: u32,
    shards: Vec<DictionaryShard>,
}

impl HuffDicDecoder {
    /// Build a decoder from the code tables and the ordered dictionary shards.
    ///
    /// Every shard must use the same index shift.
    pub fn new(tables: HuffTables, shards: Vec<DictionaryShard>) -> Result<Self, TableError> {
        let index_shift = shards.first().ok_or(TableError::NoShards)?.index_shift();
        if let Some((shard, s)) = shards
            .iter()
            .enumerate()
            .find(|(_, s)| s.index_shift() != index_shift)
        {
            return Err(TableError::MismatchedIndexShift {
                shard,
                expected: index_shift,
                actual: s.index_shift(),
            });
        }

        log::debug!(
            "huffdic: {} shards, index shift {}, {} entries",
            shards.len(),
            index_shift,
            shards.iter().map(DictionaryShard::len).sum::<usize>()
        );

        Ok(Self {
            tables,
            index_shift,
            index_mask: ((1u64 << index_shift) - 1) as u32,
            shards,
        })
    }

    pub fn tables(&self) -> &HuffTables {
        &self.tables
    }

    pub fn shards(&self) -> &[DictionaryShard] {
        &self.shards
    }

    /// Decode `source` into `destination`, returning the bytes written.
    pub fn decompress(&self, source: &[u8], destination: &mut [u8]) -> Result<usize, DecodeError> {
        let mut sink = SliceSink {
            buf: destination,
            pos: 0,
        };
        self.expand(source, &mut sink, 0)?;
        Ok(sink.pos)
    }

    /// Decode `source` into a new buffer holding at most `limit` bytes.
    pub fn decompress_to_vec(&self, source: &[u8], limit: usize) -> Result<Vec<u8>, DecodeError> {
        let mut out = Vec::new();
        self.expand(
            source,
            &mut VecSink {
                buf: &mut out,
                limit,
            },
            0,
        )?;
        Ok(out)
    }

    /// Resolve a global dictionary index.
    pub fn entry(&self, index: u32) -> Option<&DictEntry> {
        let shard = self.shards.get((index >> self.index_shift) as usize)?;
        shard.get((index & self.index_mask) as usize)
    }

    fn expand<S: Sink>(&self, source: &[u8], sink: &mut S, depth: usize) -> Result<(), DecodeError> {
        if depth == MAX_DEPTH {
            return Err(DecodeError::RecursionLimit { depth });
        }

        let mut bits: u32 = 0;
        let mut bit_count: u32 = 0;
        let mut input = source.iter();

        loop {
            while bit_count <= 24 {
                let Some(&b) = input.next() else {
                    break;
                };
                bits |= (b as u32) << (24 - bit_count);
                bit_count += 8;
            }

            let lut = self.tables.lookup((bits >> 24) as u8);
            let mut code_len = lut.code_bit_length() as u32;
            if code_len < 1 {
                return Err(DecodeError::InvalidCode);
            }
            let mut code = bits >> (32 - code_len);
            let max_code = if lut.is_terminal() {
                lut.max_code()
            } else {
                while code < self.tables.code_range(code_len).min_code {
                    code_len += 1;
                    if code_len > 32 {
                        return Err(DecodeError::CodeTooLong);
                    }
                    code = bits >> (32 - code_len);
                }
                self.tables.code_range(code_len).max_code
            };
            let index = max_code.wrapping_sub(code);

            if bit_count < code_len {
                return Ok(());
            }
            bit_count -= code_len;
            bits = bits.checked_shl(code_len).unwrap_or(0);

            let entry = self
                .entry(index)
                .ok_or(DecodeError::MissingEntry { index })?;
            if entry.is_literal() {
                sink.put(entry.data())?;
            } else {
                self.expand(entry.data(), sink, depth + 1)?;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
