//! Raw frame → thumbnail → JPEG → base64 media chunk.

use std::io::Cursor;

use base64::Engine;
use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};

use super::{PixelFormat, RawFrame};
use crate::error::DeviceError;
use crate::live::MediaChunk;

/// Largest edge, in pixels, of a frame sent to the endpoint.
pub const MAX_DIMENSION: u32 = 1024;

/// Thumbnail, JPEG-encode and base64-wrap one raw frame.
pub fn frame_to_chunk(frame: RawFrame) -> Result<MediaChunk, DeviceError> {
    let expected = frame.width as usize * frame.height as usize * frame.format.bytes_per_pixel();
    if frame.pixels.len() != expected {
        return Err(DeviceError::Backend(format!(
            "frame buffer is {} bytes, expected {} for {}x{}",
            frame.pixels.len(),
            expected,
            frame.width,
            frame.height
        )));
    }

    let image = match frame.format {
        PixelFormat::Rgb8 => RgbImage::from_raw(frame.width, frame.height, frame.pixels)
            .map(DynamicImage::ImageRgb8),
        PixelFormat::Rgba8 => RgbaImage::from_raw(frame.width, frame.height, frame.pixels)
            .map(DynamicImage::ImageRgba8),
    }
    .ok_or_else(|| DeviceError::Backend("frame buffer does not match its dimensions".to_string()))?;

    let image = if image.width() > MAX_DIMENSION || image.height() > MAX_DIMENSION {
        image.thumbnail(MAX_DIMENSION, MAX_DIMENSION)
    } else {
        image
    };

    // JPEG carries no alpha channel.
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());

    let mut jpeg = Cursor::new(Vec::new());
    rgb.write_to(&mut jpeg, ImageFormat::Jpeg)
        .map_err(|e| DeviceError::Backend(e.to_string()))?;

    let encoded = base64::engine::general_purpose::STANDARD.encode(jpeg.into_inner());
    Ok(MediaChunk::jpeg(encoded))
}
