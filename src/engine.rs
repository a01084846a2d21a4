// Text codec engine: dispatches a record to the codec named by the book.
//
// The compression method is recorded once per book by the container; the
// caller passes it in, together with the HUFF/CDIC decoder when the book
// uses one.  Nothing here chooses a method.

use crate::huffdic::{self, HuffDicDecoder};
use crate::palmdoc;
use crate::record::{self, RecordError, TextTrailers};

// ---------------------------------------------------------------------------
// Compression method
// ---------------------------------------------------------------------------

/// Text compression method identifiers as stored in the book header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum CompressionMethod {
    Uncompressed = 1,
    /// PalmDOC LZ77 + byte pairs.
    PalmDoc = 2,
    /// Huffman with dictionary ("DH").
    HuffDic = 17480,
}

impl TryFrom<u16> for CompressionMethod {
    type Error = EngineError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Uncompressed),
            2 => Ok(Self::PalmDoc),
            17480 => Ok(Self::HuffDic),
            other => Err(EngineError::UnknownMethod(other)),
        }
    }
}

impl From<CompressionMethod> for u16 {
    fn from(method: CompressionMethod) -> Self {
        method as u16
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("unknown text compression method {0:#06X}")]
    UnknownMethod(u16),

    #[error("HUFF/CDIC compressed text needs a dictionary decoder")]
    MissingDictionary,

    #[error("{0:?} encoding is not supported")]
    Unsupported(CompressionMethod),

    #[error("uncompressed text of {len} bytes exceeds capacity {capacity}")]
    TooLarge { len: usize, capacity: usize },

    #[error("PalmDOC: {0}")]
    PalmDoc(#[from] palmdoc::DecodeError),

    #[error("HUFF/CDIC: {0}")]
    HuffDic(#[from] huffdic::DecodeError),

    #[error(transparent)]
    Record(#[from] RecordError),
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Decode compressed text (trailers already removed) into at most
/// `capacity` bytes.
pub fn decode_text(
    method: CompressionMethod,
    data: &[u8],
    huffdic: Option<&HuffDicDecoder>,
    capacity: usize,
) -> Result<Vec<u8>, EngineError> {
    match method {
        CompressionMethod::Uncompressed => {
            if data.len() > capacity {
                return Err(EngineError::TooLarge {
                    len: data.len(),
                    capacity,
                });
            }
            Ok(data.to_vec())
        }
        CompressionMethod::PalmDoc => Ok(palmdoc::decompress_to_vec(data, capacity)?),
        CompressionMethod::HuffDic => {
            let decoder = huffdic.ok_or(EngineError::MissingDictionary)?;
            Ok(decoder.decompress_to_vec(data, capacity)?)
        }
    }
}

/// Strip the trailing entries from a text record, then decode it.
pub fn decode_record(
    method: CompressionMethod,
    record: &[u8],
    trailers: TextTrailers,
    huffdic: Option<&HuffDicDecoder>,
    capacity: usize,
) -> Result<Vec<u8>, EngineError> {
    let (len, _) = record::text_length(record, trailers)?;
    decode_text(method, &record[..len], huffdic, capacity)
}

/// Encode text with `method`.  HUFF/CDIC encoding is not available.
pub fn encode_text(method: CompressionMethod, text: &[u8]) -> Result<Vec<u8>, EngineError> {
    match method {
        CompressionMethod::Uncompressed => Ok(text.to_vec()),
        CompressionMethod::PalmDoc => Ok(palmdoc::compress_to_vec(text)),
        CompressionMethod::HuffDic => Err(EngineError::Unsupported(method)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
