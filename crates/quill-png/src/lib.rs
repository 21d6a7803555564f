//! A png decoder
//!
//! This features a PNG reader in Rust which supports decoding of valid
//! ISO/IEC 15948:2003 (E) images into a fixed 8 bit RGBA pixel buffer,
//! the layout asset pipelines want to hand straight to a renderer.
//!
//! # Features
//! - All standard bit depths (1, 2, 4, 8, 16) and color types
//! - Adam7 interlaced and non interlaced images
//! - Per chunk CRC and zlib adler verification, both individually
//!   defeatable for trusted inputs
//! - Hard ceilings on image geometry before anything image sized is
//!   allocated
//!
//! The input is treated as hostile throughout, every failure surfaces
//! as a specific [`DecodeError`](error::DecodeError) kind and the
//! caller's buffer is never left half written.
//!
//! # Usage
//!
//! Decode into a buffer the caller owns
//!
//!```no_run
//! use quill_core::pixel::PixelBuffer;
//!
//! let data = std::fs::read("image.png").unwrap();
//! let mut pixel = PixelBuffer::default();
//!
//! quill_png::decode(&data, &mut pixel).unwrap();
//!```
//!
//! Or inspect the geometry before paying for the pixels
//!
//!```no_run
//! use quill_png::PngDecoder;
//!
//! let data = std::fs::read("image.png").unwrap();
//! let mut decoder = PngDecoder::new(&data);
//!
//! decoder.decode_headers().unwrap();
//! let (width, height) = decoder.get_dimensions().unwrap();
//! # let _ = (width, height);
//!```
pub use decoder::{PngDecoder, PngInfo};
pub use enums::{InterlaceMethod, PngColor};
pub use quill_core;

use quill_core::pixel::PixelBuffer;

mod constants;
mod crc;
mod decoder;
mod enums;
pub mod error;
mod expand;
mod filters;
mod headers;

/// Decode a PNG byte stream into `pixel`.
///
/// On success the buffer holds the image as 8 bit RGBA, on failure it
/// is left exactly as it was handed in.
pub fn decode(data: &[u8], pixel: &mut PixelBuffer) -> Result<(), error::DecodeError>
{
    PngDecoder::new(data).decode_into(pixel)
}
