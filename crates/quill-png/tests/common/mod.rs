/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Hand assembled PNG streams for the malformed and interlaced cases
//! the reference encoder cannot produce.
#![allow(dead_code)]

use simd_adler32::Adler32;

pub const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Bitwise reference CRC-32, independent of the implementation under
/// test.
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = u32::MAX;
    for byte in data {
        crc ^= u32::from(*byte);
        for _ in 0..8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ 0xEDB8_8320
            } else {
                crc >> 1
            };
        }
    }
    !crc
}

/// Assemble one chunk: length, type, payload, crc over type+payload.
pub fn chunk(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 12);
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(tag);
    out.extend_from_slice(payload);

    let mut checksummed = tag.to_vec();
    checksummed.extend_from_slice(payload);
    out.extend_from_slice(&crc32(&checksummed).to_be_bytes());
    out
}

/// Wrap raw bytes in a zlib stream of stored deflate blocks.
pub fn zlib_stored(raw: &[u8]) -> Vec<u8> {
    let mut out = vec![0x78, 0x01];

    let blocks: Vec<&[u8]> = if raw.is_empty() {
        vec![&[][..]]
    } else {
        raw.chunks(65535).collect()
    };

    for (i, block) in blocks.iter().enumerate() {
        let last = i == blocks.len() - 1;
        // bfinal flag, btype 00, five bits of padding to the boundary
        out.push(u8::from(last));
        out.extend_from_slice(&(block.len() as u16).to_le_bytes());
        out.extend_from_slice(&(!(block.len() as u16)).to_le_bytes());
        out.extend_from_slice(block);
    }

    let mut hash = Adler32::new();
    hash.write(raw);
    out.extend_from_slice(&hash.finish().to_be_bytes());
    out
}

/// Assemble a whole PNG around the given scanline stream.
///
/// `extra_chunks` land between IHDR and IDAT.
pub fn build_png(
    width: u32, height: u32, depth: u8, color: u8, interlace: u8, extra_chunks: &[Vec<u8>],
    raw_scanlines: &[u8],
) -> Vec<u8> {
    let mut ihdr = Vec::new();
    ihdr.extend_from_slice(&width.to_be_bytes());
    ihdr.extend_from_slice(&height.to_be_bytes());
    ihdr.extend_from_slice(&[depth, color, 0, 0, interlace]);

    let mut png = SIGNATURE.to_vec();
    png.extend_from_slice(&chunk(b"IHDR", &ihdr));
    for extra in extra_chunks {
        png.extend_from_slice(extra);
    }
    png.extend_from_slice(&chunk(b"IDAT", &zlib_stored(raw_scanlines)));
    png.extend_from_slice(&chunk(b"IEND", &[]));
    png
}

/// Encode through the reference encoder, the companion for round-trip
/// tests.
pub fn encode_reference(
    width: u32, height: u32, color: png::ColorType, depth: png::BitDepth, data: &[u8],
    filter: Option<png::FilterType>, palette: Option<&[u8]>, trns: Option<&[u8]>,
) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(color);
        encoder.set_depth(depth);
        if let Some(filter) = filter {
            encoder.set_filter(filter);
        }
        if let Some(palette) = palette {
            encoder.set_palette(palette.to_vec());
        }
        if let Some(trns) = trns {
            encoder.set_trns(trns.to_vec());
        }

        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(data).unwrap();
    }
    out
}

/// Pack per pixel samples into rows of `depth` bit fields, most
/// significant bit first, each row padded to a byte boundary.
pub fn pack_bits(samples: &[u8], width: usize, height: usize, depth: usize) -> Vec<u8> {
    assert_eq!(samples.len(), width * height);
    let row_bytes = (width * depth + 7) / 8;
    let mut out = vec![0_u8; row_bytes * height];

    for y in 0..height {
        for x in 0..width {
            let sample = samples[y * width + x];
            let bit = x * depth;
            let shift = 8 - depth - (bit & 7);
            out[y * row_bytes + (bit >> 3)] |= (sample & ((1 << depth) - 1)) << shift;
        }
    }
    out
}
