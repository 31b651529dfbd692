//! Video capture sources
//!
//! A session runs at most one frame source, fixed for its lifetime by
//! [`VideoMode`]. Sources hand back raw frames; the capture loop thumbnails,
//! JPEG-encodes and base64-wraps them (see [`encode`]).

pub mod camera;
pub mod encode;
pub mod screen;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::DeviceError;

pub use self::camera::CameraSource;
pub use self::screen::ScreenSource;

/// Which video capture source, if any, a session runs.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum VideoMode {
    #[default]
    None,
    Camera,
    Screen,
}

/// Pixel layout of a grabbed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }
}

/// One uncompressed frame as produced by a camera or screen device.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub pixels: Vec<u8>,
}

/// A camera or screen device producing raw frames.
///
/// Devices open lazily on the first grab, so acquisition failures surface
/// inside the video capture loop rather than at session construction.
pub trait FrameSource: Send {
    /// Grab one frame. `Ok(None)` means the device produced no frame, which
    /// ends the capture loop as a normal termination.
    fn grab(&mut self) -> Result<Option<RawFrame>, DeviceError>;

    /// Release the device. Safe to call more than once.
    fn close(&mut self);

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Frame source factory keyed by [`VideoMode`]; `None` selects no source,
/// the other modes select exactly one.
pub struct VideoSourceFactory;

impl VideoSourceFactory {
    pub fn create(mode: VideoMode) -> Option<Box<dyn FrameSource>> {
        match mode {
            VideoMode::None => None,
            VideoMode::Camera => Some(Box::new(CameraSource::new())),
            VideoMode::Screen => Some(Box::new(ScreenSource::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_selects_at_most_one_source() {
        assert!(VideoSourceFactory::create(VideoMode::None).is_none());

        let camera = VideoSourceFactory::create(VideoMode::Camera).unwrap();
        assert_eq!(camera.name(), "camera");

        let screen = VideoSourceFactory::create(VideoMode::Screen).unwrap();
        assert_eq!(screen.name(), "screen");
    }

    #[test]
    fn video_mode_defaults_to_none() {
        assert_eq!(VideoMode::default(), VideoMode::None);
    }
}
