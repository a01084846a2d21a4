// PalmDOC LZ77 + byte-pair text compression.
//
// Token stream layout (one leading byte decides the token):
//
//   0x00, 0x09..=0x7F   literal byte
//   0x01..=0x08         escaped run: that many raw bytes follow
//   0x80..=0xBF         back-reference: 2 bytes, 11-bit distance, 3-bit length - 3
//   0xC0..=0xFF         space + (byte ^ 0x80)
//
// - `match_finder` — hash head table + distance ring used by the encoder
// - `encoder`      — single-pass compressor (`compress`, `max_compressed_size`)
// - `decoder`      — token stream decoder (`decompress`)

pub mod decoder;
pub mod encoder;
pub mod match_finder;

pub use decoder::{DecodeError, decompress, decompress_to_vec, max_decompressed_size};
pub use encoder::{EncodeError, compress, compress_to_vec, max_compressed_size};

/// Largest back-reference distance the two-byte token can carry.
pub const MAX_DISTANCE: usize = 0x7FF;

/// Shortest back-reference.
pub const MIN_MATCH: usize = 3;

/// Longest back-reference.
pub const MAX_MATCH: usize = 10;

/// Longest escaped literal run.
pub const MAX_LITERAL_RUN: usize = 8;

/// Head table buckets (12-bit hash).
pub const HASH_SIZE: usize = 0x1000;

/// Distance ring entries.
pub const CHAIN_SIZE: usize = 0x800;

/// True for bytes that are stored verbatim in the token stream.
#[inline(always)]
pub const fn is_plain_literal(b: u8) -> bool {
    b == 0x00 || matches!(b, 0x09..=0x7F)
}

/// True for the second byte of a space-letter pair.
#[inline(always)]
pub const fn is_pair_letter(b: u8) -> bool {
    matches!(b, 0x40..=0x7F)
}
