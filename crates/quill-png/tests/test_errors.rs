/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Hostile and damaged streams must surface the specific failure,
//! never a crash and never a half decoded buffer.

use quill_core::options::DecoderOptions;
use quill_core::pixel::PixelBuffer;
use quill_png::error::DecodeError;
use quill_png::PngDecoder;

mod common;

use common::{build_png, chunk, zlib_stored, SIGNATURE};

/// A minimal valid 2x2 grayscale image
fn small_png() -> Vec<u8> {
    build_png(2, 2, 8, 0, 0, &[], &[0, 1, 2, 0, 3, 4])
}

fn decode_err(data: &[u8]) -> DecodeError {
    PngDecoder::new(data).decode().unwrap_err()
}

#[test]
fn bad_signature() {
    let mut file = small_png();
    file[0] = 0x88;

    assert!(matches!(decode_err(&file), DecodeError::BadSignature));
}

#[test]
fn first_chunk_must_be_ihdr() {
    let mut file = SIGNATURE.to_vec();
    file.extend_from_slice(&chunk(b"gAMA", &100_000_u32.to_be_bytes()));
    file.extend_from_slice(&chunk(b"IEND", &[]));

    assert!(matches!(decode_err(&file), DecodeError::MissingIhdr));
}

#[test]
fn corrupted_crc_is_caught() {
    let mut file = small_png();
    // flip a byte inside the IHDR payload, the crc check has to see it
    file[18] ^= 0xFF;

    assert!(matches!(decode_err(&file), DecodeError::BadCrc { .. }));
}

#[test]
fn corrupted_crc_can_be_waved_through() {
    let mut file = small_png();
    // flip a byte of the IDAT crc itself, payload stays intact so the
    // zlib adler still matches
    let crc_position = file.len() - 16;
    file[crc_position] ^= 0xFF;

    let options = DecoderOptions::default().set_confirm_crc(false);
    assert!(PngDecoder::new_with_options(&file, options).decode().is_ok());
}

#[test]
fn every_truncation_is_reported_as_truncation() {
    let file = small_png();

    for cut in 1..file.len() {
        let err = PngDecoder::new(&file[..file.len() - cut]).decode().unwrap_err();

        assert!(
            matches!(
                err,
                DecodeError::TruncatedInput { .. } | DecodeError::Inflate(_)
            ),
            "cut {cut}: {err:?}"
        );
    }
}

#[test]
fn data_after_iend_is_rejected() {
    let mut file = small_png();
    file.push(0);

    assert!(matches!(decode_err(&file), DecodeError::TrailingData { .. }));
}

#[test]
fn unknown_critical_chunk_is_rejected() {
    let extra = chunk(b"ABCD", &[1, 2, 3]);
    let file = build_png(2, 2, 8, 0, 0, &[extra], &[0, 1, 2, 0, 3, 4]);

    assert!(matches!(
        decode_err(&file),
        DecodeError::UnknownCriticalChunk(tag) if &tag == b"ABCD"
    ));
}

#[test]
fn unknown_ancillary_chunk_is_skipped() {
    let extra = chunk(b"abCD", &[1, 2, 3]);
    let file = build_png(2, 2, 8, 0, 0, &[extra], &[0, 1, 2, 0, 3, 4]);

    assert!(PngDecoder::new(&file).decode().is_ok());
}

#[test]
fn oversized_dimensions_are_rejected_before_allocation() {
    let options = DecoderOptions::default().set_max_pixels(50);
    let file = build_png(100, 100, 8, 0, 0, &[], &[]);

    let err = PngDecoder::new_with_options(&file, options)
        .decode()
        .unwrap_err();
    assert!(matches!(err, DecodeError::TooLarge { limit: 50, .. }));
}

#[test]
fn oversized_width_is_rejected() {
    let file = build_png(1 << 20, 1, 8, 0, 0, &[], &[]);

    assert!(matches!(decode_err(&file), DecodeError::TooLarge { .. }));
}

#[test]
fn zero_dimensions_are_rejected() {
    let file = build_png(0, 4, 8, 0, 0, &[], &[]);

    assert!(matches!(decode_err(&file), DecodeError::MalformedChunk(_)));
}

#[test]
fn sixteen_bit_palette_is_rejected() {
    let palette = chunk(b"PLTE", &[0; 6]);
    let file = build_png(2, 2, 16, 3, 0, &[palette], &[0, 0, 0]);

    assert!(matches!(
        decode_err(&file),
        DecodeError::UnsupportedFormat { color: 3, depth: 16 }
    ));
}

#[test]
fn indexed_image_requires_a_palette() {
    let file = build_png(2, 2, 8, 3, 0, &[], &[0, 0, 1, 0, 1, 0]);

    assert!(matches!(decode_err(&file), DecodeError::BadChunkOrder(_)));
}

#[test]
fn palette_index_out_of_range() {
    // two palette entries, one pixel references entry five
    let palette = chunk(b"PLTE", &[10, 20, 30, 40, 50, 60]);
    let file = build_png(2, 1, 8, 3, 0, &[palette], &[0, 1, 5]);

    assert!(matches!(
        decode_err(&file),
        DecodeError::BadPaletteIndex { index: 5, palette_size: 2 }
    ));
}

#[test]
fn plte_on_grayscale_is_rejected() {
    let palette = chunk(b"PLTE", &[1, 2, 3]);
    let file = build_png(2, 2, 8, 0, 0, &[palette], &[0, 1, 2, 0, 3, 4]);

    assert!(matches!(decode_err(&file), DecodeError::BadChunkOrder(_)));
}

#[test]
fn trns_with_the_wrong_size_is_rejected() {
    // grayscale keys are two bytes, hand it three
    let trns = chunk(b"tRNS", &[0, 1, 2]);
    let file = build_png(2, 2, 8, 0, 0, &[trns], &[0, 1, 2, 0, 3, 4]);

    assert!(matches!(decode_err(&file), DecodeError::MalformedChunk(_)));
}

#[test]
fn trns_on_an_alpha_color_type_is_rejected() {
    let trns = chunk(b"tRNS", &[0, 1]);
    let file = build_png(1, 1, 8, 6, 0, &[trns], &[0, 1, 2, 3, 4]);

    assert!(matches!(decode_err(&file), DecodeError::MalformedChunk(_)));
}

#[test]
fn out_of_range_filter_byte_is_rejected() {
    let file = build_png(2, 2, 8, 0, 0, &[], &[7, 1, 2, 0, 3, 4]);

    assert!(matches!(decode_err(&file), DecodeError::BadFilterType(7)));
}

#[test]
fn short_pixel_data_is_rejected() {
    // geometry wants six bytes of scanlines plus two filter bytes,
    // deliver one row only
    let file = build_png(2, 2, 8, 0, 0, &[], &[0, 1, 2]);

    assert!(matches!(
        decode_err(&file),
        DecodeError::TruncatedPixelData { expected: 6, found: 3 }
    ));
}

#[test]
fn corrupt_zlib_stream_is_surfaced() {
    // an IDAT that is not a zlib stream at all
    let mut file = SIGNATURE.to_vec();
    let mut ihdr = Vec::new();
    ihdr.extend_from_slice(&2_u32.to_be_bytes());
    ihdr.extend_from_slice(&2_u32.to_be_bytes());
    ihdr.extend_from_slice(&[8, 0, 0, 0, 0]);
    file.extend_from_slice(&chunk(b"IHDR", &ihdr));
    file.extend_from_slice(&chunk(b"IDAT", &[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07]));
    file.extend_from_slice(&chunk(b"IEND", &[]));

    assert!(matches!(decode_err(&file), DecodeError::Inflate(_)));
}

#[test]
fn failures_leave_the_buffer_untouched() {
    let good = small_png();
    let mut pixel = PixelBuffer::default();

    PngDecoder::new(&good).decode_into(&mut pixel).unwrap();
    let before: Vec<u8> = pixel.data().to_vec();

    let mut bad = small_png();
    bad[18] ^= 0xFF;
    assert!(PngDecoder::new(&bad).decode_into(&mut pixel).is_err());

    // the failed decode must not have modified the buffer
    assert_eq!(pixel.data(), &before[..]);
    assert_eq!(pixel.width(), 2);
    assert_eq!(pixel.height(), 2);
}

#[test]
fn iend_with_a_payload_is_rejected() {
    let mut file = SIGNATURE.to_vec();
    let mut ihdr = Vec::new();
    ihdr.extend_from_slice(&1_u32.to_be_bytes());
    ihdr.extend_from_slice(&1_u32.to_be_bytes());
    ihdr.extend_from_slice(&[8, 0, 0, 0, 0]);
    file.extend_from_slice(&chunk(b"IHDR", &ihdr));
    file.extend_from_slice(&chunk(b"IDAT", &zlib_stored(&[0, 42])));
    file.extend_from_slice(&chunk(b"IEND", &[9]));

    assert!(matches!(decode_err(&file), DecodeError::MalformedChunk(_)));
}

#[test]
fn headers_can_be_inspected_without_decoding() {
    let file = small_png();
    let mut decoder = PngDecoder::new(&file);

    assert!(decoder.get_dimensions().is_none());
    decoder.decode_headers().unwrap();

    assert_eq!(decoder.get_dimensions(), Some((2, 2)));
    assert_eq!(decoder.get_depth(), Some(8));
}
