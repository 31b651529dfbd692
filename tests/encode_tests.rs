//! Frame encoding pipeline: thumbnail bound, JPEG output, base64 wrapping.

use base64::Engine;
use live_bridge::live::{MediaChunk, IMAGE_MIME_TYPE};
use live_bridge::video::encode::{frame_to_chunk, MAX_DIMENSION};
use live_bridge::video::{PixelFormat, RawFrame};

fn rgb_frame(width: u32, height: u32) -> RawFrame {
    RawFrame {
        width,
        height,
        format: PixelFormat::Rgb8,
        pixels: vec![200; width as usize * height as usize * 3],
    }
}

fn decode_jpeg(chunk: &MediaChunk) -> image::DynamicImage {
    let MediaChunk::Image { mime_type, data } = chunk else {
        panic!("expected an image chunk, got {chunk:?}");
    };
    assert_eq!(mime_type, IMAGE_MIME_TYPE);

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data)
        .expect("image payload should be valid base64");
    assert_eq!(&bytes[..2], &[0xFF, 0xD8], "JPEG magic bytes");

    image::load_from_memory(&bytes).expect("payload should decode as an image")
}

#[test]
fn oversized_frames_are_thumbnailed_preserving_aspect_ratio() {
    let chunk = frame_to_chunk(rgb_frame(2048, 512)).unwrap();
    let decoded = decode_jpeg(&chunk);

    assert_eq!(decoded.width(), MAX_DIMENSION);
    assert_eq!(decoded.height(), 256);
}

#[test]
fn small_frames_are_not_upscaled() {
    let chunk = frame_to_chunk(rgb_frame(320, 240)).unwrap();
    let decoded = decode_jpeg(&chunk);

    assert_eq!(decoded.width(), 320);
    assert_eq!(decoded.height(), 240);
}

#[test]
fn rgba_frames_lose_their_alpha_channel() {
    let frame = RawFrame {
        width: 16,
        height: 16,
        format: PixelFormat::Rgba8,
        pixels: vec![255; 16 * 16 * 4],
    };

    let chunk = frame_to_chunk(frame).unwrap();
    let decoded = decode_jpeg(&chunk);
    assert_eq!(decoded.width(), 16);
    assert_eq!(decoded.height(), 16);
}

#[test]
fn mismatched_buffer_length_is_rejected() {
    let frame = RawFrame {
        width: 8,
        height: 8,
        format: PixelFormat::Rgb8,
        pixels: vec![0; 10],
    };

    assert!(frame_to_chunk(frame).is_err());
}
