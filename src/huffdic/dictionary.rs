// Dictionary entries and shards.
//
// A decoded Huffman symbol is a global dictionary index.  The dictionary is
// split into shards of `1 << index_shift` entries each (the last shard may
// be shorter), so an index resolves as:
//
//   shard = index >> index_shift
//   entry = index & ((1 << index_shift) - 1)
//
// An entry is either literal text or a nested Huffman bitstream that expands
// to more dictionary entries.

use super::tables::TableError;

/// Literal flag in a packed entry header.
const LITERAL_FLAG: u16 = 0x8000;

/// Data length mask in a packed entry header.
const LENGTH_MASK: u16 = 0x7FFF;

/// One dictionary entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictEntry {
    literal: bool,
    data: Vec<u8>,
}

impl DictEntry {
    /// Entry copied to the output as is.
    pub fn literal(data: impl Into<Vec<u8>>) -> Self {
        Self {
            literal: true,
            data: data.into(),
        }
    }

    /// Entry whose data is itself Huffman coded.
    pub fn nested(data: impl Into<Vec<u8>>) -> Self {
        Self {
            literal: false,
            data: data.into(),
        }
    }

    /// Build an entry from its 16-bit header (bit 15 literal, bits 14..0
    /// length) and the bytes that follow it.  Bytes past the length are
    /// ignored.
    pub fn from_packed(header: u16, data: &[u8]) -> Result<Self, TableError> {
        let len = (header & LENGTH_MASK) as usize;
        let body = data.get(..len).ok_or(TableError::Truncated {
            what: "dictionary entry",
            needed: len,
            actual: data.len(),
        })?;
        Ok(Self {
            literal: header & LITERAL_FLAG != 0,
            data: body.to_vec(),
        })
    }

    #[inline]
    pub fn is_literal(&self) -> bool {
        self.literal
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// A contiguous run of dictionary entries.
#[derive(Debug, Clone)]
pub struct DictionaryShard {
    index_shift: u32,
    entries: Vec<DictEntry>,
}

impl DictionaryShard {
    /// A shard may hold at most `1 << index_shift` entries.
    pub fn new(index_shift: u32, entries: Vec<DictEntry>) -> Result<Self, TableError> {
        if index_shift >= 32 {
            return Err(TableError::InvalidIndexShift(index_shift));
        }
        if entries.len() as u64 > 1u64 << index_shift {
            return Err(TableError::ShardTooLarge {
                entries: entries.len(),
                index_shift,
            });
        }
        Ok(Self {
            index_shift,
            entries,
        })
    }

    #[inline]
    pub fn index_shift(&self) -> u32 {
        self.index_shift
    }

    #[inline]
    pub fn entries(&self) -> &[DictEntry] {
        &self.entries
    }

    #[inline]
    pub fn get(&self, offset: usize) -> Option<&DictEntry> {
        self.entries.get(offset)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_literal_entry() {
        let e = DictEntry::from_packed(0x8003, b"thesis").unwrap();
        assert!(e.is_literal());
        assert_eq!(e.data(), b"the");
    }

    #[test]
    fn packed_nested_entry() {
        let e = DictEntry::from_packed(0x0002, &[0xAB, 0xCD]).unwrap();
        assert!(!e.is_literal());
        assert_eq!(e.data(), [0xAB, 0xCD]);
    }

    #[test]
    fn packed_entry_too_short() {
        let err = DictEntry::from_packed(0x8005, b"abc").unwrap_err();
        assert_eq!(
            err,
            TableError::Truncated {
                what: "dictionary entry",
                needed: 5,
                actual: 3
            }
        );
    }

    #[test]
    fn shard_capacity() {
        let entries = vec![DictEntry::literal("a"); 4];
        assert!(DictionaryShard::new(2, entries.clone()).is_ok());
        assert_eq!(
            DictionaryShard::new(1, entries).unwrap_err(),
            TableError::ShardTooLarge {
                entries: 4,
                index_shift: 1
            }
        );
    }

    #[test]
    fn shard_shift_range() {
        assert_eq!(
            DictionaryShard::new(32, Vec::new()).unwrap_err(),
            TableError::InvalidIndexShift(32)
        );
        let s = DictionaryShard::new(31, Vec::new()).unwrap();
        assert!(s.is_empty());
        assert_eq!(s.index_shift(), 31);
    }
}
