use alloc::string::String;
use enough::StopReason;

use crate::container::ChunkId;

/// Errors from IFF/ILBM decoding.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum IlbmError {
    #[error("not an IFF file (first chunk is not FORM)")]
    NotIff,

    #[error("FORM payload is not an ILBM picture")]
    NotIlbm,

    #[error("FORM size {declared} exceeds available data ({actual} bytes)")]
    ContainerTooShort { declared: u32, actual: usize },

    #[error("truncated {id} chunk at offset {offset}: need {needed} bytes, {available} available")]
    TruncatedChunk {
        id: ChunkId,
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("missing {id} chunk")]
    MissingChunk { id: ChunkId },

    #[error("BMHD chunk appears more than once")]
    DuplicateHeader,

    #[error("{id} chunk before BMHD")]
    ChunkBeforeHeader { id: ChunkId },

    #[error("BODY chunk before CMAP")]
    BodyBeforePalette,

    #[error("BMHD chunk is {found} bytes, expected {expected}")]
    WrongHeaderSize { found: u32, expected: u32 },

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("compression type {0:#04x} is not supported")]
    UnsupportedCompression(u8),

    #[error("lasso masking is not supported")]
    UnsupportedMasking,

    #[error("unknown masking type {0:#04x}")]
    UnknownMasking(u8),

    #[error("bitplane count {0} out of range (1-8)")]
    UnsupportedBitplanes(u8),

    #[error("extra-halfbrite display mode is not supported (CAMG {camg:#010x})")]
    UnsupportedDisplayMode { camg: u32 },

    #[error("CMAP has {entries} entries, {required} required for {bitplanes} bitplanes")]
    PaletteTooSmall {
        entries: usize,
        required: usize,
        bitplanes: u8,
    },

    #[error("invalid pixel data: {0}")]
    InvalidData(String),

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl From<StopReason> for IlbmError {
    fn from(r: StopReason) -> Self {
        IlbmError::Cancelled(r)
    }
}
