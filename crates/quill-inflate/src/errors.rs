//! Errors possible during decompression

use std::fmt::{Debug, Formatter};

/// Reasons a deflate stream can fail to decompress.
///
/// Every variant is terminal, the decoder never resynchronizes after
/// reporting one of these.
pub enum InflateError
{
    /// The compressed stream ended in the middle of a block
    InsufficientData,
    /// The stream violates the deflate format
    Corrupt(&'static str),
    /// A back-reference pointed before the start of the output
    BadDistance
    {
        distance: usize, available: usize
    },
    /// The checksum carried by the zlib wrapper does not match the
    /// decompressed bytes
    MismatchedAdler
    {
        expected: u32, found: u32
    },
    /// The output grew past the configured limit
    OutputTooLarge
    {
        limit: usize, size: usize
    }
}

impl Debug for InflateError
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        match self
        {
            Self::InsufficientData => writeln!(f, "Insufficient data"),
            Self::Corrupt(reason) => writeln!(f, "{reason}"),
            Self::BadDistance {
                distance,
                available
            } => writeln!(
                f,
                "Match distance {distance} reaches before the start of output, only {available} bytes exist"
            ),
            Self::MismatchedAdler { expected, found } =>
            {
                writeln!(f, "Mismatched adler, expected {expected} but found {found}")
            }
            Self::OutputTooLarge { limit, size } => writeln!(
                f,
                "Output limit exceeded, set limit was {limit} and output size is {size}"
            )
        }
    }
}
