use std::sync::atomic::AtomicUsize;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Final statistics returned by [`LiveSession::run`](super::LiveSession::run).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    pub session_id: String,

    /// When the session started connecting.
    pub started_at: DateTime<Utc>,

    /// Total session duration in seconds.
    pub duration_secs: f64,

    /// Microphone frames captured.
    pub audio_frames_captured: usize,

    /// Chunks of any kind forwarded to the endpoint.
    pub chunks_sent: usize,

    /// Video frames encoded and queued for transmission.
    pub video_frames: usize,

    /// Inbound audio chunks written to the speaker.
    pub audio_chunks_played: usize,

    /// Text deltas surfaced for display.
    pub text_deltas: usize,
}

/// Shared counters the loops update while the session runs.
#[derive(Debug, Default)]
pub(crate) struct SessionCounters {
    pub frames_captured: AtomicUsize,
    pub chunks_sent: AtomicUsize,
    pub video_frames: AtomicUsize,
    pub chunks_played: AtomicUsize,
    pub text_deltas: AtomicUsize,
}
