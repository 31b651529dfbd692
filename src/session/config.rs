use serde::{Deserialize, Serialize};

use crate::audio::{CHANNELS, FRAME_SAMPLES, RECEIVE_SAMPLE_RATE, SEND_SAMPLE_RATE};
use crate::live::ConnectConfig;
use crate::video::VideoMode;

/// Configuration for one live session. Fixed for the session's lifetime;
/// a new session needs a fresh [`LiveSession`](super::LiveSession).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier (e.g. "live-7f9c...").
    pub session_id: String,

    /// Model the endpoint should run.
    pub model: String,

    /// Connection parameters handed to the live client.
    pub connect: ConnectConfig,

    /// Which video capture source, if any, to run.
    pub video_mode: VideoMode,

    /// Microphone sample rate in Hz.
    pub send_sample_rate: u32,

    /// Playback sample rate in Hz.
    pub receive_sample_rate: u32,

    /// Channel count for both capture and playback.
    pub channels: u16,

    /// Samples per captured microphone frame.
    pub frame_samples: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("live-{}", uuid::Uuid::new_v4()),
            model: "gemini-2.0-flash-live-001".to_string(),
            connect: ConnectConfig::default(),
            video_mode: VideoMode::None,
            send_sample_rate: SEND_SAMPLE_RATE,
            receive_sample_rate: RECEIVE_SAMPLE_RATE,
            channels: CHANNELS,
            frame_samples: FRAME_SAMPLES,
        }
    }
}
