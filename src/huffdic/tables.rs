// Canonical Huffman decode tables.
//
// Two tables drive decoding:
//   - **Lookup table** (256 entries): indexed by the top 8 bits of the bit
//     window.  Terminal entries give the code length and `max_code` outright;
//     non-terminal entries give a starting length to extend from.
//   - **Code-range table** (32 entries): per code length (1-based), the
//     inclusive `[min_code, max_code]` of the canonical codes of that length.
//
// Both arrive as big-endian byte blocks from the container parser:
//   lookup entry:  bits 31..8 max_code | bit 7 terminal | bits 4..0 code length
//   code range:    u32 min_code, u32 max_code

/// Lookup table entries.
pub const LUT_ENTRIES: usize = 256;

/// Code-range table entries (one per code length 1..=32).
pub const CODE_RANGE_ENTRIES: usize = 32;

/// Size of the packed big-endian lookup table.
pub const LUT_BYTES: usize = LUT_ENTRIES * 4;

/// Size of the packed big-endian code-range table.
pub const CODE_RANGE_BYTES: usize = CODE_RANGE_ENTRIES * 8;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TableError {
    #[error("{what} truncated: need {needed} bytes, have {actual}")]
    Truncated {
        what: &'static str,
        needed: usize,
        actual: usize,
    },

    #[error("dictionary index shift {0} out of range (must be < 32)")]
    InvalidIndexShift(u32),

    #[error("dictionary has no shards")]
    NoShards,

    #[error("shard {shard} uses index shift {actual}, expected {expected}")]
    MismatchedIndexShift {
        shard: usize,
        expected: u32,
        actual: u32,
    },

    #[error("shard holds {entries} entries, more than index shift {index_shift} allows")]
    ShardTooLarge { entries: usize, index_shift: u32 },
}

// ---------------------------------------------------------------------------
// Lookup entry
// ---------------------------------------------------------------------------

/// One packed lookup-table entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LutEntry(u32);

impl LutEntry {
    /// Wrap a packed big-endian-decoded value.
    #[inline]
    pub const fn from_packed(packed: u32) -> Self {
        Self(packed)
    }

    /// Build an entry from its fields.  `max_code` keeps its low 24 bits.
    pub const fn new(max_code: u32, terminal: bool, code_bit_length: u8) -> Self {
        let flag = if terminal { 0x80 } else { 0 };
        Self((max_code << 8) | flag | (code_bit_length as u32 & 0x1F))
    }

    #[inline]
    pub const fn packed(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn max_code(self) -> u32 {
        self.0 >> 8
    }

    #[inline]
    pub const fn is_terminal(self) -> bool {
        self.0 & 0x80 != 0
    }

    /// Code length in bits; for non-terminal entries, the length to start
    /// extending from.
    #[inline]
    pub const fn code_bit_length(self) -> u8 {
        (self.0 & 0x1F) as u8
    }
}

// ---------------------------------------------------------------------------
// Code range
// ---------------------------------------------------------------------------

/// Inclusive canonical code bounds for one code length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodeRange {
    pub min_code: u32,
    pub max_code: u32,
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Immutable lookup + code-range tables.
#[derive(Debug, Clone)]
pub struct HuffTables {
    lut: [LutEntry; LUT_ENTRIES],
    code_ranges: [CodeRange; CODE_RANGE_ENTRIES],
}

impl HuffTables {
    pub fn new(
        lut: [LutEntry; LUT_ENTRIES],
        code_ranges: [CodeRange; CODE_RANGE_ENTRIES],
    ) -> Self {
        Self { lut, code_ranges }
    }

    /// Parse the big-endian lookup and code-range blocks.
    ///
    /// Extra trailing bytes are ignored.
    pub fn from_be_bytes(lut: &[u8], code_ranges: &[u8]) -> Result<Self, TableError> {
        if lut.len() < LUT_BYTES {
            return Err(TableError::Truncated {
                what: "lookup table",
                needed: LUT_BYTES,
                actual: lut.len(),
            });
        }
        if code_ranges.len() < CODE_RANGE_BYTES {
            return Err(TableError::Truncated {
                what: "code-range table",
                needed: CODE_RANGE_BYTES,
                actual: code_ranges.len(),
            });
        }

        let mut tables = Self::new(
            [LutEntry::default(); LUT_ENTRIES],
            [CodeRange::default(); CODE_RANGE_ENTRIES],
        );
        for (entry, chunk) in tables.lut.iter_mut().zip(lut.chunks_exact(4)) {
            *entry = LutEntry::from_packed(read_be_u32(chunk));
        }
        for (range, chunk) in tables
            .code_ranges
            .iter_mut()
            .zip(code_ranges.chunks_exact(8))
        {
            range.min_code = read_be_u32(&chunk[..4]);
            range.max_code = read_be_u32(&chunk[4..]);
        }
        Ok(tables)
    }

    /// Lookup entry for the top byte of the bit window.
    #[inline(always)]
    pub fn lookup(&self, top: u8) -> LutEntry {
        self.lut[top as usize]
    }

    /// Code range for a code length in `1..=32`.
    #[inline(always)]
    pub fn code_range(&self, code_bit_length: u32) -> CodeRange {
        self.code_ranges[code_bit_length as usize - 1]
    }
}

#[inline]
fn read_be_u32(chunk: &[u8]) -> u32 {
    u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
