pub mod cpal;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::DeviceError;

pub use self::cpal::CpalBackend;

/// Microphone and speaker PCM channel count (mono).
pub const CHANNELS: u16 = 1;

/// Sample rate of captured microphone audio.
pub const SEND_SAMPLE_RATE: u32 = 16_000;

/// Sample rate of audio the endpoint sends back for playback.
pub const RECEIVE_SAMPLE_RATE: u32 = 24_000;

/// Samples per captured microphone frame.
pub const FRAME_SAMPLES: usize = 1024;

/// An open microphone stream, exclusively owned by the audio capture loop.
#[async_trait]
pub trait MicStream: Send {
    /// Read one fixed-size PCM frame (i16 little-endian), blocking until the
    /// device fills it.
    async fn read_frame(&mut self) -> Result<Vec<u8>, DeviceError>;

    /// Release the stream. Safe to call more than once.
    fn close(&mut self);
}

/// An open speaker stream, exclusively owned by the playback loop.
#[async_trait]
pub trait SpeakerStream: Send {
    /// Write one PCM chunk, returning only once the device has consumed it.
    ///
    /// This blocking contract is what keeps playback in-order and gapless:
    /// the playback loop never issues a second write before the first
    /// completes.
    async fn write(&mut self, pcm: &[u8]) -> Result<(), DeviceError>;

    /// Release the stream. Safe to call more than once.
    fn close(&mut self);
}

/// Audio device backend: opens microphone and speaker streams and tears the
/// subsystem down at session end.
#[async_trait]
pub trait AudioBackend: Send + Sync {
    async fn open_input(
        &self,
        sample_rate: u32,
        channels: u16,
        frame_samples: usize,
    ) -> Result<Box<dyn MicStream>, DeviceError>;

    async fn open_output(
        &self,
        sample_rate: u32,
        channels: u16,
    ) -> Result<Box<dyn SpeakerStream>, DeviceError>;

    /// Tear down the audio subsystem. Safe to call more than once.
    fn shutdown(&self);

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// The closed set of audio backends a session can be built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioBackendKind {
    Cpal,
}

/// Audio backend factory, selected once at session construction.
pub struct AudioBackendFactory;

impl AudioBackendFactory {
    pub fn create(kind: AudioBackendKind) -> Arc<dyn AudioBackend> {
        match kind {
            AudioBackendKind::Cpal => Arc::new(CpalBackend::new()),
        }
    }
}
