//! Mobitext: MOBI/KF8 book text codecs in Rust.
//!
//! The crate provides:
//! - PalmDOC LZ77 + byte-pair compression and decompression (`palmdoc`)
//! - HUFF/CDIC dictionary decompression for legacy books (`huffdic`)
//! - Text-record chunking and trailer handling (`record`)
//! - Dispatch by the book's compression method (`engine`)
//!
//! All codecs work on plain byte buffers; locating records inside a book and
//! parsing its headers is left to the caller.
//!
//! # Quick Start
//!
//! ```
//! use mobitext::palmdoc;
//!
//! let text = b"The quick brown fox jumps over the lazy dog. The quick brown fox.";
//! let packed = palmdoc::compress_to_vec(text);
//! let unpacked = palmdoc::decompress_to_vec(&packed, text.len()).unwrap();
//! assert_eq!(unpacked, text);
//! ```

pub mod engine;
pub mod huffdic;
pub mod palmdoc;
pub mod record;

pub use engine::{CompressionMethod, EngineError};
pub use huffdic::HuffDicDecoder;
pub use record::{RecordOptions, TextTrailers};
