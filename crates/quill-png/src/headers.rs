use log::{info, warn};

use crate::decoder::{PaletteEntry, PngChunk, PngDecoder};
use crate::enums::{InterlaceMethod, PngColor};
use crate::error::DecodeError;

impl<'a> PngDecoder<'a>
{
    pub(crate) fn parse_ihdr(&mut self, chunk: PngChunk) -> Result<(), DecodeError>
    {
        if self.seen_hdr
        {
            return Err(DecodeError::BadChunkOrder("multiple IHDR chunks, corrupt PNG"));
        }
        if chunk.length != 13
        {
            return Err(DecodeError::MalformedChunk("bad IHDR length, expected 13"));
        }

        let width = self.stream.get_u32_be()? as usize;
        let height = self.stream.get_u32_be()? as usize;

        if width == 0 || height == 0
        {
            return Err(DecodeError::MalformedChunk("width or height cannot be zero"));
        }
        if width > self.options.get_max_width()
        {
            return Err(DecodeError::TooLarge {
                width,
                height,
                limit: self.options.get_max_width()
            });
        }
        if height > self.options.get_max_height()
        {
            return Err(DecodeError::TooLarge {
                width,
                height,
                limit: self.options.get_max_height()
            });
        }
        // the pixel count ceiling is what actually bounds memory, check
        // it before anything image sized gets allocated
        match width.checked_mul(height)
        {
            Some(pixels) if pixels <= self.options.get_max_pixels() =>
            {}
            _ =>
            {
                return Err(DecodeError::TooLarge {
                    width,
                    height,
                    limit: self.options.get_max_pixels()
                });
            }
        }

        self.png_info.width = width;
        self.png_info.height = height;

        let depth = self.stream.get_u8()?;
        let color = self.stream.get_u8()?;

        let img_color = match PngColor::from_int(color)
        {
            Some(img_color) => img_color,
            None => return Err(DecodeError::UnsupportedFormat { color, depth })
        };

        let depth_ok = match img_color
        {
            PngColor::Luma => matches!(depth, 1 | 2 | 4 | 8 | 16),
            PngColor::Palette => matches!(depth, 1 | 2 | 4 | 8),
            PngColor::RGB | PngColor::LumaA | PngColor::RGBA => matches!(depth, 8 | 16),
            PngColor::Unknown => false
        };

        if !depth_ok
        {
            return Err(DecodeError::UnsupportedFormat { color, depth });
        }

        self.png_info.depth = depth;
        self.png_info.color = img_color;
        self.png_info.component = img_color.num_components();

        if self.stream.get_u8()? != 0
        {
            return Err(DecodeError::MalformedChunk("unknown compression method"));
        }
        if self.stream.get_u8()? != 0
        {
            return Err(DecodeError::MalformedChunk("unknown filter method"));
        }

        let interlace = self.stream.get_u8()?;

        match InterlaceMethod::from_int(interlace)
        {
            Some(method) => self.png_info.interlace_method = method,
            None => return Err(DecodeError::MalformedChunk("unknown interlace method"))
        }

        // crc was confirmed when the chunk header was read
        self.stream.skip(4);

        info!("Width: {}", self.png_info.width);
        info!("Height: {}", self.png_info.height);
        info!("Depth: {}", self.png_info.depth);
        info!("Color type: {:?}", self.png_info.color);
        info!("Interlace: {:?}", self.png_info.interlace_method);

        self.seen_hdr = true;

        Ok(())
    }

    pub(crate) fn parse_plte(&mut self, chunk: PngChunk) -> Result<(), DecodeError>
    {
        if self.png_info.color != PngColor::Palette
        {
            return Err(DecodeError::BadChunkOrder("PLTE chunk on a non indexed image"));
        }
        if self.seen_plte
        {
            return Err(DecodeError::BadChunkOrder("multiple PLTE chunks, corrupt PNG"));
        }
        if self.seen_trns
        {
            return Err(DecodeError::BadChunkOrder("PLTE chunk after tRNS"));
        }
        if self.seen_idat
        {
            return Err(DecodeError::BadChunkOrder("PLTE chunk after image data"));
        }
        if chunk.length == 0
        {
            return Err(DecodeError::MalformedChunk("empty PLTE chunk"));
        }
        if chunk.length % 3 != 0
        {
            return Err(DecodeError::MalformedChunk("PLTE length not a multiple of three"));
        }
        if chunk.length / 3 > 256
        {
            return Err(DecodeError::MalformedChunk("PLTE with more than 256 entries"));
        }

        self.palette.resize(chunk.length / 3, PaletteEntry::default());

        for entry in self.palette.iter_mut()
        {
            entry.red = self.stream.get_u8()?;
            entry.green = self.stream.get_u8()?;
            entry.blue = self.stream.get_u8()?;
        }

        // skip crc
        self.stream.skip(4);
        self.seen_plte = true;

        Ok(())
    }

    pub(crate) fn parse_idat(&mut self, png_chunk: PngChunk) -> Result<(), DecodeError>
    {
        // append to one accumulating buffer, multiple IDAT chunks carry
        // a single compressed stream split in arrival order
        let idat_stream = self.stream.get(png_chunk.length)?;

        self.idat_chunks.extend_from_slice(idat_stream);

        // skip crc
        self.stream.skip(4);
        self.seen_idat = true;

        Ok(())
    }

    pub(crate) fn parse_trns(&mut self, chunk: PngChunk) -> Result<(), DecodeError>
    {
        if self.seen_trns
        {
            return Err(DecodeError::BadChunkOrder("multiple tRNS chunks, corrupt PNG"));
        }
        if self.seen_idat
        {
            return Err(DecodeError::BadChunkOrder("tRNS chunk after image data"));
        }

        match self.png_info.color
        {
            PngColor::Luma =>
            {
                if chunk.length != 2
                {
                    return Err(DecodeError::MalformedChunk("tRNS length for grayscale must be 2"));
                }
                self.trns_bytes[0] = self.stream.get_u16_be()?;
            }
            PngColor::RGB =>
            {
                if chunk.length != 6
                {
                    return Err(DecodeError::MalformedChunk("tRNS length for truecolor must be 6"));
                }
                self.trns_bytes[0] = self.stream.get_u16_be()?;
                self.trns_bytes[1] = self.stream.get_u16_be()?;
                self.trns_bytes[2] = self.stream.get_u16_be()?;
            }
            PngColor::Palette =>
            {
                if !self.seen_plte
                {
                    return Err(DecodeError::BadChunkOrder("tRNS chunk before PLTE"));
                }
                if chunk.length > self.palette.len()
                {
                    return Err(DecodeError::MalformedChunk("tRNS with more entries than the palette"));
                }
                for i in 0..chunk.length
                {
                    self.palette[i].alpha = self.stream.get_u8()?;
                }
            }
            _ =>
            {
                // color types carrying their own alpha channel cannot
                // also declare a transparency key
                return Err(DecodeError::MalformedChunk("tRNS chunk on a color type with an alpha channel"));
            }
        }

        // skip crc
        self.stream.skip(4);
        self.seen_trns = true;

        Ok(())
    }

    pub(crate) fn parse_gama(&mut self, chunk: PngChunk) -> Result<(), DecodeError>
    {
        if chunk.length != 4
        {
            warn!("Invalid gAMA chunk length {}, skipping", chunk.length);
            self.stream.skip(chunk.length + 4);

            return Ok(());
        }

        let gamma = self.stream.get_u32_be()? as f32 / 100_000.0;

        if gamma == 0.0
        {
            warn!("Gamma value of 0.0 is invalid, ignoring the chunk");
        }
        else
        {
            self.png_info.gamma = Some(gamma);
        }

        // skip crc
        self.stream.skip(4);

        Ok(())
    }
}
