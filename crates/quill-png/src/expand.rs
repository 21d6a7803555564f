//! Expansion of reconstructed scanlines into the output layout
//!
//! Reconstructed rows still carry samples at their native depth,
//! packed sub byte, one byte, or big endian two byte. Everything is
//! normalized here into the fixed 8 bit RGBA layout of the pixel
//! buffer: sub byte samples scale up by bit replication, 16 bit
//! samples keep their most significant byte, palette indices resolve
//! through the palette.

use crate::constants::DEPTH_SCALE_TABLE;
use crate::decoder::{PaletteEntry, PngInfo};
use crate::enums::PngColor;
use crate::error::DecodeError;

/// Pull the `i`th `depth` bit wide sample out of a packed row, most
/// significant bit first within each byte.
#[inline(always)]
fn sample_bits(row: &[u8], i: usize, depth: usize) -> u8
{
    let bit = i * depth;
    let shift = 8 - depth - (bit & 7);

    (row[bit >> 3] >> shift) & ((1 << depth) - 1)
}

/// Expand one reconstructed scanline of `width` pixels into `rgba`,
/// which must hold exactly `width * 4` bytes.
///
/// `trns` carries the transparent color key for grayscale/truecolor
/// images, compared against the sample at its native depth, an exact
/// match becomes a fully transparent pixel. Palette images carry
/// their transparency on the palette entries instead.
pub(crate) fn expand_scanline(
    info: &PngInfo, palette: &[PaletteEntry], trns: Option<[u16; 3]>, row: &[u8], width: usize,
    rgba: &mut [u8]
) -> Result<(), DecodeError>
{
    debug_assert_eq!(rgba.len(), width * 4);

    let depth = usize::from(info.depth);

    match info.color
    {
        PngColor::Luma =>
        {
            if depth < 8
            {
                let scale = DEPTH_SCALE_TABLE[depth];

                for (i, px) in rgba.chunks_exact_mut(4).enumerate()
                {
                    let sample = sample_bits(row, i, depth);
                    let value = sample * scale;
                    let alpha = luma_alpha(trns, u16::from(sample));

                    px.copy_from_slice(&[value, value, value, alpha]);
                }
            }
            else if depth == 8
            {
                for (sample, px) in row.iter().zip(rgba.chunks_exact_mut(4))
                {
                    let alpha = luma_alpha(trns, u16::from(*sample));

                    px.copy_from_slice(&[*sample, *sample, *sample, alpha]);
                }
            }
            else
            {
                for (pair, px) in row.chunks_exact(2).zip(rgba.chunks_exact_mut(4))
                {
                    let native = u16::from_be_bytes([pair[0], pair[1]]);
                    let value = pair[0];
                    let alpha = luma_alpha(trns, native);

                    px.copy_from_slice(&[value, value, value, alpha]);
                }
            }
        }
        PngColor::LumaA =>
        {
            if depth == 8
            {
                for (pair, px) in row.chunks_exact(2).zip(rgba.chunks_exact_mut(4))
                {
                    px.copy_from_slice(&[pair[0], pair[0], pair[0], pair[1]]);
                }
            }
            else
            {
                for (quad, px) in row.chunks_exact(4).zip(rgba.chunks_exact_mut(4))
                {
                    px.copy_from_slice(&[quad[0], quad[0], quad[0], quad[2]]);
                }
            }
        }
        PngColor::RGB =>
        {
            if depth == 8
            {
                for (rgb, px) in row.chunks_exact(3).zip(rgba.chunks_exact_mut(4))
                {
                    let native = [u16::from(rgb[0]), u16::from(rgb[1]), u16::from(rgb[2])];
                    let alpha = rgb_alpha(trns, native);

                    px.copy_from_slice(&[rgb[0], rgb[1], rgb[2], alpha]);
                }
            }
            else
            {
                for (rgb, px) in row.chunks_exact(6).zip(rgba.chunks_exact_mut(4))
                {
                    let native = [
                        u16::from_be_bytes([rgb[0], rgb[1]]),
                        u16::from_be_bytes([rgb[2], rgb[3]]),
                        u16::from_be_bytes([rgb[4], rgb[5]])
                    ];
                    let alpha = rgb_alpha(trns, native);

                    px.copy_from_slice(&[rgb[0], rgb[2], rgb[4], alpha]);
                }
            }
        }
        PngColor::RGBA =>
        {
            if depth == 8
            {
                for (src, px) in row.chunks_exact(4).zip(rgba.chunks_exact_mut(4))
                {
                    px.copy_from_slice(src);
                }
            }
            else
            {
                for (src, px) in row.chunks_exact(8).zip(rgba.chunks_exact_mut(4))
                {
                    px.copy_from_slice(&[src[0], src[2], src[4], src[6]]);
                }
            }
        }
        PngColor::Palette =>
        {
            for (i, px) in rgba.chunks_exact_mut(4).enumerate()
            {
                let index = if depth < 8 { sample_bits(row, i, depth) } else { row[i] };

                if usize::from(index) >= palette.len()
                {
                    return Err(DecodeError::BadPaletteIndex {
                        index,
                        palette_size: palette.len()
                    });
                }
                let entry = palette[usize::from(index)];

                px.copy_from_slice(&[entry.red, entry.green, entry.blue, entry.alpha]);
            }
        }
        PngColor::Unknown => unreachable!()
    }

    Ok(())
}

#[inline(always)]
fn luma_alpha(trns: Option<[u16; 3]>, native: u16) -> u8
{
    match trns
    {
        Some(key) if key[0] == native => 0,
        _ => 255
    }
}

#[inline(always)]
fn rgb_alpha(trns: Option<[u16; 3]>, native: [u16; 3]) -> u8
{
    match trns
    {
        Some(key) if key == native => 0,
        _ => 255
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::enums::InterlaceMethod;

    fn info(color: PngColor, depth: u8) -> PngInfo
    {
        PngInfo {
            width: 0,
            height: 0,
            depth,
            color,
            component: color.num_components(),
            interlace_method: InterlaceMethod::Standard,
            gamma: None
        }
    }

    #[test]
    fn one_bit_luma_unpacks_msb_first()
    {
        let info = info(PngColor::Luma, 1);
        let mut rgba = [0_u8; 32];

        expand_scanline(&info, &[], None, &[0b1011_0010], 8, &mut rgba).unwrap();

        let values: Vec<u8> = rgba.chunks_exact(4).map(|px| px[0]).collect();
        assert_eq!(values, [255, 0, 255, 255, 0, 0, 255, 0]);
        assert!(rgba.chunks_exact(4).all(|px| px[3] == 255));
    }

    #[test]
    fn sixteen_bit_keeps_the_high_byte()
    {
        let info = info(PngColor::RGB, 16);
        let mut rgba = [0_u8; 4];

        expand_scanline(
            &info,
            &[],
            None,
            &[0xAB, 0xCD, 0x12, 0x34, 0xFF, 0x00],
            1,
            &mut rgba
        )
        .unwrap();
        assert_eq!(rgba, [0xAB, 0x12, 0xFF, 255]);
    }

    #[test]
    fn transparency_key_needs_an_exact_match()
    {
        let info = info(PngColor::Luma, 16);
        let trns = Some([0xABCD_u16, 0, 0]);
        let mut rgba = [0_u8; 8];

        expand_scanline(&info, &[], trns, &[0xAB, 0xCD, 0xAB, 0xCE], 2, &mut rgba).unwrap();

        // first sample matches the key exactly, second differs only in
        // the low byte and must stay opaque
        assert_eq!(rgba[3], 0);
        assert_eq!(rgba[7], 255);
    }

    #[test]
    fn palette_indices_are_bounds_checked()
    {
        let info = info(PngColor::Palette, 8);
        let palette = vec![PaletteEntry::default(); 2];
        let mut rgba = [0_u8; 4];

        let err = expand_scanline(&info, &palette, None, &[5], 1, &mut rgba).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::BadPaletteIndex { index: 5, palette_size: 2 }
        ));
    }
}
