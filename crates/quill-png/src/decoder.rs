use log::trace;
use quill_core::bytestream::ByteReader;
use quill_core::options::DecoderOptions;
use quill_core::pixel::{PixelBuffer, PixelFormat};
use quill_inflate::{DeflateDecoder, DeflateOptions};

use crate::constants::{PNG_SIGNATURE, XORIG, XSPC, YORIG, YSPC};
use crate::crc::crc32;
use crate::enums::{FilterMethod, InterlaceMethod, PngChunkType, PngColor};
use crate::error::DecodeError;
use crate::expand::expand_scanline;
use crate::filters::{handle_avg, handle_paeth, handle_sub, handle_up};

/// A single palette entry
#[derive(Copy, Clone)]
pub(crate) struct PaletteEntry
{
    pub red:   u8,
    pub green: u8,
    pub blue:  u8,
    pub alpha: u8
}

impl Default for PaletteEntry
{
    fn default() -> Self
    {
        // a tRNS chunk may contain fewer values than there are palette
        // entries, the alpha of all remaining entries stays 255
        PaletteEntry {
            red:   0,
            green: 0,
            blue:  0,
            alpha: 255
        }
    }
}

#[derive(Copy, Clone)]
pub(crate) struct PngChunk
{
    pub length:     usize,
    pub chunk_type: PngChunkType,
    pub chunk:      [u8; 4],
    pub crc:        u32
}

/// Geometry and declared metadata parsed from the header chunk
#[derive(Default, Debug, Copy, Clone)]
pub struct PngInfo
{
    pub width:            usize,
    pub height:           usize,
    pub depth:            u8,
    pub color:            PngColor,
    pub component:        u8,
    pub interlace_method: InterlaceMethod,
    /// Gamma declared by a gAMA chunk, passed through untouched
    pub gamma:            Option<f32>
}

/// A PNG decoder over a borrowed byte stream.
///
/// One instance decodes one image, the pixel data lands in a
/// [`PixelBuffer`] owned by the caller.
pub struct PngDecoder<'a>
{
    pub(crate) stream:      ByteReader<'a>,
    pub(crate) options:     DecoderOptions,
    pub(crate) png_info:    PngInfo,
    pub(crate) palette:     Vec<PaletteEntry>,
    pub(crate) trns_bytes:  [u16; 3],
    pub(crate) idat_chunks: Vec<u8>,
    pub(crate) seen_hdr:    bool,
    pub(crate) seen_plte:   bool,
    pub(crate) seen_trns:   bool,
    pub(crate) seen_idat:   bool
}

impl<'a> PngDecoder<'a>
{
    pub fn new(data: &'a [u8]) -> PngDecoder<'a>
    {
        PngDecoder::new_with_options(data, DecoderOptions::default())
    }

    pub fn new_with_options(data: &'a [u8], options: DecoderOptions) -> PngDecoder<'a>
    {
        PngDecoder {
            stream: ByteReader::new(data),
            options,
            png_info: PngInfo::default(),
            palette: Vec::new(),
            trns_bytes: [0; 3],
            idat_chunks: Vec::new(),
            seen_hdr: false,
            seen_plte: false,
            seen_trns: false,
            seen_idat: false
        }
    }

    /// Image width and height, available once headers are decoded
    pub const fn get_dimensions(&self) -> Option<(usize, usize)>
    {
        if !self.seen_hdr
        {
            return None;
        }
        Some((self.png_info.width, self.png_info.height))
    }

    /// Bit depth declared by the header
    pub const fn get_depth(&self) -> Option<u8>
    {
        if !self.seen_hdr
        {
            return None;
        }
        Some(self.png_info.depth)
    }

    /// Color type declared by the header
    pub fn get_color(&self) -> Option<PngColor>
    {
        if !self.seen_hdr
        {
            return None;
        }
        Some(self.png_info.color)
    }

    /// Everything parsed from the header so far
    pub fn get_info(&self) -> Option<&PngInfo>
    {
        if !self.seen_hdr
        {
            return None;
        }
        Some(&self.png_info)
    }

    /// Layout every decode produces, regardless of the source format
    pub const fn output_format(&self) -> PixelFormat
    {
        PixelFormat::Rgba8
    }

    fn read_chunk_header(&mut self) -> Result<PngChunk, DecodeError>
    {
        // format is length - chunk type - [data] - crc
        let chunk_length = self.stream.get_u32_be()? as usize;
        let chunk_type_int = self.stream.get_u32_be()?.to_be_bytes();

        if chunk_length > (1 << 31) - 1
        {
            return Err(DecodeError::MalformedChunk("chunk length above the format maximum"));
        }
        if !self.stream.has(chunk_length + 4 /* crc */)
        {
            return Err(DecodeError::TruncatedInput {
                position:  self.stream.position(),
                requested: chunk_length + 4
            });
        }

        let mut crc_bytes = [0; 4];

        crc_bytes.copy_from_slice(self.stream.peek_at(chunk_length, 4)?);
        let crc = u32::from_be_bytes(crc_bytes);

        let chunk_type = match &chunk_type_int
        {
            b"IHDR" => PngChunkType::IHDR,
            b"PLTE" => PngChunkType::PLTE,
            b"IDAT" => PngChunkType::IDAT,
            b"IEND" => PngChunkType::IEND,
            b"tRNS" => PngChunkType::tRNS,
            b"gAMA" => PngChunkType::gAMA,
            _ => PngChunkType::unkn
        };

        if self.options.get_confirm_crc()
        {
            // step back over the type, the checksum covers type + payload
            self.stream.rewind(4);

            let bytes = self.stream.peek_at(0, chunk_length + 4)?;
            let calculated = crc32(bytes);

            self.stream.skip(4);

            if crc != calculated
            {
                return Err(DecodeError::BadCrc { expected: crc, found: calculated });
            }
        }

        Ok(PngChunk {
            length: chunk_length,
            chunk_type,
            chunk: chunk_type_int,
            crc
        })
    }

    /// Parse the signature and the header chunk, leaving the stream at
    /// the first chunk after IHDR.
    ///
    /// Geometry getters work after this, letting a caller reject or
    /// pre-plan for an image before paying for decompression.
    pub fn decode_headers(&mut self) -> Result<(), DecodeError>
    {
        if self.seen_hdr
        {
            return Ok(());
        }

        let signature = self.stream.get_u64_be()?;

        if signature != PNG_SIGNATURE
        {
            return Err(DecodeError::BadSignature);
        }

        // the header chunk must come first
        if self.stream.peek_at(4, 4)? != b"IHDR"
        {
            return Err(DecodeError::MissingIhdr);
        }

        let header = self.read_chunk_header()?;
        self.parse_ihdr(header)
    }

    /// Decode the whole image, returning the pixel buffer by value.
    pub fn decode(&mut self) -> Result<PixelBuffer, DecodeError>
    {
        let mut pixel = PixelBuffer::default();

        self.decode_into(&mut pixel)?;
        Ok(pixel)
    }

    /// Decode the whole image into `pixel`.
    ///
    /// The buffer is only touched on success, any failure leaves it
    /// exactly as handed in.
    pub fn decode_into(&mut self, pixel: &mut PixelBuffer) -> Result<(), DecodeError>
    {
        self.decode_headers()?;

        loop
        {
            let header = self.read_chunk_header()?;

            match header.chunk_type
            {
                PngChunkType::IHDR => self.parse_ihdr(header)?,
                PngChunkType::PLTE => self.parse_plte(header)?,
                PngChunkType::IDAT => self.parse_idat(header)?,
                PngChunkType::tRNS => self.parse_trns(header)?,
                PngChunkType::gAMA => self.parse_gama(header)?,
                PngChunkType::IEND =>
                {
                    if header.length != 0
                    {
                        return Err(DecodeError::MalformedChunk("IEND chunk with a payload"));
                    }
                    self.stream.skip(4);
                    break;
                }
                PngChunkType::unkn => self.handle_unknown_chunk(header)?
            }
        }

        if !self.stream.is_eof()
        {
            return Err(DecodeError::TrailingData { position: self.stream.position() });
        }
        if self.png_info.color == PngColor::Palette && !self.seen_plte
        {
            return Err(DecodeError::BadChunkOrder("palette indexed image without a PLTE chunk"));
        }

        let expected = self.expected_stream_len();
        let inflated = self.inflate(expected)?;

        // already done with the compressed stream
        self.idat_chunks = Vec::new();

        if inflated.len() < expected
        {
            return Err(DecodeError::TruncatedPixelData {
                expected,
                found: inflated.len()
            });
        }

        let info = self.png_info;
        let trns = self.transparency_key();

        let mut rgba = vec![0_u8; info.width * info.height * PixelFormat::Rgba8.bytes_per_pixel()];

        match info.interlace_method
        {
            InterlaceMethod::Standard =>
            {
                let row_stride = info.width * 4;

                self.reconstruct_pass(&inflated, info.width, info.height, |y, row| {
                    let out_row = &mut rgba[y * row_stride..(y + 1) * row_stride];

                    expand_scanline(&info, &self.palette, trns, row, info.width, out_row)
                })?;
            }
            InterlaceMethod::Adam7 =>
            {
                let mut image_offset = 0;
                let mut pass_rgba = Vec::new();

                for p in 0..7
                {
                    let (pass_width, pass_height) =
                        adam7_pass_dimensions(info.width, info.height, p);

                    // small images leave some passes with no pixels
                    if pass_width == 0 || pass_height == 0
                    {
                        continue;
                    }

                    let pass_len = scanline_stream_len(&info, pass_width, pass_height);
                    let pass_data = &inflated[image_offset..image_offset + pass_len];

                    pass_rgba.clear();
                    pass_rgba.resize(pass_width * 4, 0);

                    self.reconstruct_pass(pass_data, pass_width, pass_height, |y, row| {
                        expand_scanline(&info, &self.palette, trns, row, pass_width, &mut pass_rgba)?;

                        // scatter the pass row into final geometry
                        let out_y = YORIG[p] + y * YSPC[p];

                        for i in 0..pass_width
                        {
                            let out_x = XORIG[p] + i * XSPC[p];
                            let dst = (out_y * info.width + out_x) * 4;

                            rgba[dst..dst + 4].copy_from_slice(&pass_rgba[i * 4..i * 4 + 4]);
                        }
                        Ok(())
                    })?;

                    image_offset += pass_len;
                }
            }
            InterlaceMethod::Unknown => unreachable!()
        }

        pixel.assign(info.width, info.height, PixelFormat::Rgba8, rgba);

        Ok(())
    }

    /// Undo filtering for `height` rows of `width` pixels, handing
    /// each reconstructed row to `emit` before moving to the next.
    ///
    /// `raw` must hold at least the stream length implied by the
    /// geometry, callers check that up front.
    fn reconstruct_pass(
        &self, raw: &[u8], width: usize, height: usize,
        mut emit: impl FnMut(usize, &[u8]) -> Result<(), DecodeError>
    ) -> Result<(), DecodeError>
    {
        let info = &self.png_info;
        let depth = usize::from(info.depth);
        let channels = usize::from(info.component);

        let row_bytes = (width * channels * depth + 7) / 8;
        // the filter distance is one whole pixel, a byte at minimum
        let components = ((channels * depth) / 8).max(1);

        let mut prev_row = vec![0_u8; row_bytes];
        let mut current = vec![0_u8; row_bytes];

        for y in 0..height
        {
            let in_row = &raw[y * (row_bytes + 1)..(y + 1) * (row_bytes + 1)];

            let filter_byte = in_row[0];
            let raw_row = &in_row[1..];

            let filter = FilterMethod::from_int(filter_byte)
                .ok_or(DecodeError::BadFilterType(filter_byte))?;

            match filter
            {
                FilterMethod::None => current.copy_from_slice(raw_row),

                FilterMethod::Sub => handle_sub(raw_row, &mut current, components),

                FilterMethod::Up => handle_up(&prev_row, raw_row, &mut current),

                FilterMethod::Average => handle_avg(&prev_row, raw_row, &mut current, components),

                FilterMethod::Paeth => handle_paeth(&prev_row, raw_row, &mut current, components)
            }

            emit(y, &current)?;

            std::mem::swap(&mut prev_row, &mut current);
        }
        Ok(())
    }

    /// Exact byte length of the decompressed scanline stream the
    /// header geometry implies.
    fn expected_stream_len(&self) -> usize
    {
        let info = &self.png_info;

        match info.interlace_method
        {
            InterlaceMethod::Standard =>
            {
                scanline_stream_len(info, info.width, info.height)
            }
            InterlaceMethod::Adam7 =>
            {
                let mut total = 0;

                for p in 0..7
                {
                    let (pass_width, pass_height) =
                        adam7_pass_dimensions(info.width, info.height, p);

                    if pass_width != 0 && pass_height != 0
                    {
                        total += scanline_stream_len(info, pass_width, pass_height);
                    }
                }
                total
            }
            InterlaceMethod::Unknown => unreachable!()
        }
    }

    /// Undo deflate encoding of the accumulated image data chunks.
    fn inflate(&mut self, expected: usize) -> Result<Vec<u8>, DecodeError>
    {
        // Deflate does not store its decompressed size but the header
        // geometry fixes it exactly, so pre-allocate that much and
        // refuse to go past it.
        let options = DeflateOptions::default()
            .set_size_hint(expected)
            .set_limit(expected)
            .set_confirm_checksum(self.options.get_confirm_adler());

        let mut decoder = DeflateDecoder::new_with_options(&self.idat_chunks, options);

        decoder.decode_zlib().map_err(DecodeError::Inflate)
    }

    /// The transparent color key, when one applies to this image.
    fn transparency_key(&self) -> Option<[u16; 3]>
    {
        if !self.seen_trns
        {
            return None;
        }
        match self.png_info.color
        {
            PngColor::Luma | PngColor::RGB => Some(self.trns_bytes),
            // indexed transparency lives on the palette entries
            _ => None
        }
    }

    pub(crate) fn handle_unknown_chunk(&mut self, chunk: PngChunk) -> Result<(), DecodeError>
    {
        // bit 5 of the first type byte separates ancillary from
        // critical chunks
        if chunk.chunk[0] & (1 << 5) == 0
        {
            return Err(DecodeError::UnknownCriticalChunk(chunk.chunk));
        }

        trace!(
            "Skipping unknown ancillary chunk {:?}, {} bytes, crc {:08x}",
            core::str::from_utf8(&chunk.chunk).unwrap_or("XXXX"),
            chunk.length,
            chunk.crc
        );
        self.stream.skip(chunk.length + 4);

        Ok(())
    }
}

/// Bytes one pass of `width x height` pixels occupies in the
/// decompressed stream, filter bytes included.
fn scanline_stream_len(info: &PngInfo, width: usize, height: usize) -> usize
{
    let row_bytes = (width * usize::from(info.component) * usize::from(info.depth) + 7) / 8;

    (row_bytes + 1) * height
}

/// Width and height of an Adam7 reduced pass, zero when the pass has
/// no pixels.
const fn adam7_pass_dimensions(width: usize, height: usize, pass: usize) -> (usize, usize)
{
    let pass_width = if width > XORIG[pass]
    {
        (width - XORIG[pass] + XSPC[pass] - 1) / XSPC[pass]
    }
    else
    {
        0
    };
    let pass_height = if height > YORIG[pass]
    {
        (height - YORIG[pass] + YSPC[pass] - 1) / YSPC[pass]
    }
    else
    {
        0
    };

    (pass_width, pass_height)
}
