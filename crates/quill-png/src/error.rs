//! Decode failures
//!
//! Every failure is terminal and tagged, the decoder never hands back
//! a partially filled or blank image in place of an error.

use std::fmt::{Debug, Formatter};

use quill_core::bytestream::EndOfStream;
use quill_inflate::errors::InflateError;

pub enum DecodeError
{
    /// The stream does not begin with the PNG signature
    BadSignature,
    /// The first chunk in the stream is not the header chunk
    MissingIhdr,
    /// A bit depth and color type pairing the format does not define
    UnsupportedFormat
    {
        color: u8, depth: u8
    },
    /// Stored chunk CRC and the one computed over its contents disagree
    BadCrc
    {
        expected: u32, found: u32
    },
    /// A chunk appeared somewhere the format forbids it
    BadChunkOrder(&'static str),
    /// An unrecognized chunk the format says must be understood
    UnknownCriticalChunk([u8; 4]),
    /// A recognized chunk whose payload is inconsistent with the header
    MalformedChunk(&'static str),
    /// The container ended before its end chunk
    TruncatedInput
    {
        position: usize, requested: usize
    },
    /// The decompressed scanline stream is shorter than the header
    /// geometry requires
    TruncatedPixelData
    {
        expected: usize, found: usize
    },
    /// Bytes remain in the stream after the end chunk
    TrailingData
    {
        position: usize
    },
    /// A scanline carried a filter byte outside the defined range
    BadFilterType(u8),
    /// A pixel referenced a palette entry past the end of the palette
    BadPaletteIndex
    {
        index: u8, palette_size: usize
    },
    /// Declared dimensions exceed a configured ceiling
    TooLarge
    {
        width: usize, height: usize, limit: usize
    },
    /// Decompression of the image data failed, the inner error is
    /// surfaced verbatim. `InsufficientData` here means the compressed
    /// stream itself was cut short.
    Inflate(InflateError)
}

impl Debug for DecodeError
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        match self
        {
            Self::BadSignature => writeln!(f, "Bad PNG signature, not a png"),
            Self::MissingIhdr => writeln!(f, "First chunk is not IHDR, corrupt PNG"),
            Self::UnsupportedFormat { color, depth } => writeln!(
                f,
                "Unsupported bit depth/color type pairing, color {color} with depth {depth}"
            ),
            Self::BadCrc { expected, found } => writeln!(
                f,
                "CRC does not match, expected {expected} but found {found}"
            ),
            Self::BadChunkOrder(reason) => writeln!(f, "{reason}"),
            Self::UnknownCriticalChunk(chunk) => writeln!(
                f,
                "Unknown chunk {:?} marked critical, cannot continue",
                core::str::from_utf8(chunk).unwrap_or("XXXX")
            ),
            Self::MalformedChunk(reason) => writeln!(f, "{reason}"),
            Self::TruncatedInput {
                position,
                requested
            } => writeln!(
                f,
                "Stream ended early, needed {requested} more bytes at position {position}"
            ),
            Self::TruncatedPixelData { expected, found } => writeln!(
                f,
                "Not enough pixel data, expected {expected} bytes but found {found}"
            ),
            Self::TrailingData { position } =>
            {
                writeln!(f, "Data after the IEND chunk at position {position}")
            }
            Self::BadFilterType(filter) => writeln!(f, "Unknown filter {filter}"),
            Self::BadPaletteIndex {
                index,
                palette_size
            } => writeln!(
                f,
                "Palette index {index} out of range, palette holds {palette_size} entries"
            ),
            Self::TooLarge {
                width,
                height,
                limit
            } => writeln!(
                f,
                "Image dimensions {width}x{height} larger than configured limit {limit}, aborting"
            ),
            Self::Inflate(err) => writeln!(f, "Error decoding image data: {err:?}")
        }
    }
}

impl From<EndOfStream> for DecodeError
{
    fn from(err: EndOfStream) -> Self
    {
        Self::TruncatedInput {
            position:  err.position,
            requested: err.requested
        }
    }
}

impl From<InflateError> for DecodeError
{
    fn from(err: InflateError) -> Self
    {
        Self::Inflate(err)
    }
}
