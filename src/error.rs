use alloc::string::String;
use core::fmt;
use enough::StopReason;

/// A structural region of a BMP file that must be fully present.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Region {
    InfoHeader,
    Bitfields,
    ColorTable,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Region::InfoHeader => "info header",
            Region::Bitfields => "bitfields segment",
            Region::ColorTable => "color table",
        })
    }
}

/// Fatal inspection errors. Any of these aborts the inspection at the point
/// where it was detected.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum InspectError {
    #[error("file is too small to be a BMP")]
    TooSmall,

    #[error("not a BMP file")]
    NotBmp,

    #[error("file type {0:?} not supported")]
    UnsupportedFileType(String),

    #[error("unsupported BMP version (info header size {0})")]
    UnsupportedHeader(u32),

    #[error("unexpected end of file in {0}")]
    UnexpectedEof(Region),

    #[error("unreasonable color table size ({0} entries)")]
    UnreasonablePaletteSize(u32),

    #[error("invalid BitCount {bit_count}")]
    InvalidBitCount { bit_count: u16 },

    #[error("bad bfOffBits value {offset} (expected {min}..={max})")]
    BadPixelOffset { offset: u32, min: u64, max: u64 },

    #[error("invalid color profile location")]
    InvalidProfileLocation,

    #[error("invalid color profile size")]
    InvalidProfileSize,

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl From<StopReason> for InspectError {
    fn from(r: StopReason) -> Self {
        InspectError::Cancelled(r)
    }
}
