//! Default camera frame source built on nokhwa.

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;
use tracing::{debug, info, warn};

use super::{FrameSource, PixelFormat, RawFrame};
use crate::error::DeviceError;

/// Grabs frames from the default camera. The device opens lazily on the
/// first grab and stays open until [`FrameSource::close`].
pub struct CameraSource {
    camera: Option<Camera>,
}

impl CameraSource {
    pub fn new() -> Self {
        Self { camera: None }
    }

    fn open(&mut self) -> Result<(), DeviceError> {
        if self.camera.is_some() {
            return Ok(());
        }

        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution);
        let mut camera = Camera::new(CameraIndex::Index(0), requested)
            .map_err(|e| DeviceError::Backend(e.to_string()))?;
        camera
            .open_stream()
            .map_err(|e| DeviceError::Backend(e.to_string()))?;

        info!("camera opened");
        self.camera = Some(camera);
        Ok(())
    }
}

impl Default for CameraSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for CameraSource {
    fn grab(&mut self) -> Result<Option<RawFrame>, DeviceError> {
        self.open()?;
        let Some(camera) = self.camera.as_mut() else {
            return Err(DeviceError::Backend("camera not open".to_string()));
        };

        // A device that stops producing frames ends the capture loop
        // normally rather than failing the session.
        let buffer = match camera.frame() {
            Ok(buffer) => buffer,
            Err(e) => {
                warn!(error = %e, "camera produced no frame");
                return Ok(None);
            }
        };

        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| DeviceError::Backend(e.to_string()))?;
        let (width, height) = decoded.dimensions();

        Ok(Some(RawFrame {
            width,
            height,
            format: PixelFormat::Rgb8,
            pixels: decoded.into_raw(),
        }))
    }

    fn close(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            let _ = camera.stop_stream();
            debug!("camera released");
        }
    }

    fn name(&self) -> &str {
        "camera"
    }
}
