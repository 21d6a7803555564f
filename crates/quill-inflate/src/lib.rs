//! A streaming deflate decoder
//!
//! This crate implements RFC 1951 deflate decompression together with
//! the RFC 1950 zlib wrapper around it, which is the form image
//! containers carry their scanline data in.
//!
//! The decompressed size is not stored anywhere in a deflate stream,
//! so the decoder grows its output as it goes. Callers that know the
//! size the output must come out to can pass it as both a size hint
//! (pre-allocation) and a hard limit (hostile stream bound) through
//! [`DeflateOptions`].
//!
//! ```no_run
//! use quill_inflate::DeflateDecoder;
//!
//! let data = [0_u8; 23];
//! let mut decoder = DeflateDecoder::new(&data);
//! let bytes = decoder.decode_zlib();
//! ```
pub use crate::decoder::{DeflateDecoder, DeflateOptions};

mod bitstream;
mod constants;
mod decoder;
pub mod errors;
mod huffman;
