//! Screen snapshot frame source built on xcap.

use tracing::debug;
use xcap::Monitor;

use super::{FrameSource, PixelFormat, RawFrame};
use crate::error::DeviceError;

/// Grabs snapshots of the primary monitor.
pub struct ScreenSource {
    released: bool,
}

impl ScreenSource {
    pub fn new() -> Self {
        Self { released: false }
    }
}

impl Default for ScreenSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for ScreenSource {
    fn grab(&mut self) -> Result<Option<RawFrame>, DeviceError> {
        let monitors = Monitor::all().map_err(|e| DeviceError::Backend(e.to_string()))?;
        let Some(monitor) = monitors.into_iter().next() else {
            return Ok(None);
        };

        let image = monitor
            .capture_image()
            .map_err(|e| DeviceError::Backend(e.to_string()))?;

        Ok(Some(RawFrame {
            width: image.width(),
            height: image.height(),
            format: PixelFormat::Rgba8,
            pixels: image.into_raw(),
        }))
    }

    fn close(&mut self) {
        if !self.released {
            self.released = true;
            debug!("screen source released");
        }
    }

    fn name(&self) -> &str {
        "screen"
    }
}
