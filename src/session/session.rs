use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::cancel::CancelToken;
use super::config::SessionConfig;
use super::loops;
use super::stats::{SessionCounters, SessionStats};
use crate::audio::{AudioBackend, AudioBackendFactory, AudioBackendKind};
use crate::error::InitError;
use crate::live::{LiveClient, LiveHandle, MediaChunk, TextDelta};
use crate::video::{FrameSource, VideoSourceFactory};

/// Capacity of the outbound media channel. The session's only backpressure
/// control: producers block once this many chunks await transmission.
pub(crate) const OUTBOUND_CAPACITY: usize = 5;

/// Cadence of the video capture loop.
const VIDEO_FRAME_INTERVAL: Duration = Duration::from_secs(1);

/// One end-to-end duplex streaming session, from connect to full teardown.
///
/// `run` owns the whole lifecycle: it establishes the connection, opens the
/// microphone, spawns the concurrent loops, waits for the first of them to
/// finish for any reason, cancels and joins the rest, and releases every
/// resource. A session is single-use; build a new one for the next run.
pub struct LiveSession {
    config: SessionConfig,
    client: Arc<dyn LiveClient>,
    audio: Arc<dyn AudioBackend>,
    video: Option<Box<dyn FrameSource>>,
    cancel: CancelToken,
    counters: Arc<SessionCounters>,
    text_tx: mpsc::UnboundedSender<TextDelta>,
    text_rx: Option<mpsc::UnboundedReceiver<TextDelta>>,
}

impl LiveSession {
    /// Build a session with the default hardware backends, selected once by
    /// the audio and video factories.
    pub fn new(config: SessionConfig, client: Arc<dyn LiveClient>) -> Self {
        let audio = AudioBackendFactory::create(AudioBackendKind::Cpal);
        let video = VideoSourceFactory::create(config.video_mode);
        Self::with_parts(config, client, audio, video)
    }

    /// Dependency-injected constructor for tests and embedders.
    pub fn with_parts(
        config: SessionConfig,
        client: Arc<dyn LiveClient>,
        audio: Arc<dyn AudioBackend>,
        video: Option<Box<dyn FrameSource>>,
    ) -> Self {
        let (text_tx, text_rx) = mpsc::unbounded_channel();
        Self {
            config,
            client,
            audio,
            video,
            cancel: CancelToken::new(),
            counters: Arc::new(SessionCounters::default()),
            text_tx,
            text_rx: Some(text_rx),
        }
    }

    /// Token that stops the session from outside. To the orchestrator an
    /// external stop is indistinguishable from a loop finishing on its own.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Display-only stream of text deltas. Returns `Some` on the first call.
    pub fn text_deltas(&mut self) -> Option<mpsc::UnboundedReceiver<TextDelta>> {
        self.text_rx.take()
    }

    /// Run the session to completion.
    ///
    /// Only initialization failures (connect, microphone) are returned as
    /// errors; anything that goes wrong after the loops are spawned is
    /// logged by the failing loop and absorbed into teardown.
    pub async fn run(mut self) -> Result<SessionStats, InitError> {
        let started_at = Utc::now();
        info!(
            session_id = %self.config.session_id,
            model = %self.config.model,
            video_mode = ?self.config.video_mode,
            "live session starting"
        );

        let LiveHandle {
            sender,
            receiver,
            mut closer,
        } = self
            .client
            .connect(&self.config.model, &self.config.connect)
            .await?;

        // The microphone is required hardware: failing to open it aborts
        // before any channel exists or any loop spawns.
        let mic = match self
            .audio
            .open_input(
                self.config.send_sample_rate,
                self.config.channels,
                self.config.frame_samples,
            )
            .await
        {
            Ok(mic) => mic,
            Err(e) => {
                error!(error = %e, "failed to open microphone");
                closer.close().await;
                self.audio.shutdown();
                return Err(InitError::Microphone(e));
            }
        };

        let (out_tx, out_rx) = mpsc::channel::<MediaChunk>(OUTBOUND_CAPACITY);
        let (in_tx, in_rx) = mpsc::unbounded_channel::<Vec<u8>>();

        let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(5);

        handles.push(tokio::spawn(loops::transmit(
            out_rx,
            sender,
            Arc::clone(&self.counters),
            self.cancel.clone(),
        )));
        handles.push(tokio::spawn(loops::capture_audio(
            mic,
            out_tx.clone(),
            Arc::clone(&self.counters),
            self.cancel.clone(),
        )));
        if let Some(source) = self.video.take() {
            handles.push(tokio::spawn(loops::capture_video(
                source,
                out_tx.clone(),
                VIDEO_FRAME_INTERVAL,
                Arc::clone(&self.counters),
                self.cancel.clone(),
            )));
        }
        // Producers hold their own clones.
        drop(out_tx);

        handles.push(tokio::spawn(loops::receive(
            receiver,
            in_tx,
            self.text_tx.clone(),
            Arc::clone(&self.counters),
            self.cancel.clone(),
        )));
        handles.push(tokio::spawn(loops::play(
            Arc::clone(&self.audio),
            self.config.receive_sample_rate,
            self.config.channels,
            in_rx,
            Arc::clone(&self.counters),
            self.cancel.clone(),
        )));

        // The first loop to finish, for any reason, ends the session.
        let (first, index, rest) = future::select_all(handles).await;
        if let Err(e) = first {
            error!(error = %e, "session loop panicked");
        }
        debug!(loop_index = index, "first loop finished, cancelling the rest");
        self.cancel.cancel();

        for joined in future::join_all(rest).await {
            if let Err(e) = joined {
                error!(error = %e, "session loop panicked during shutdown");
            }
        }

        // Every loop has unwound and released its own device; close the
        // connection and the audio subsystem last. Both are idempotent.
        closer.close().await;
        self.audio.shutdown();

        let duration = Utc::now().signed_duration_since(started_at);
        let stats = SessionStats {
            session_id: self.config.session_id.clone(),
            started_at,
            duration_secs: duration.num_milliseconds() as f64 / 1000.0,
            audio_frames_captured: self.counters.frames_captured.load(Ordering::SeqCst),
            chunks_sent: self.counters.chunks_sent.load(Ordering::SeqCst),
            video_frames: self.counters.video_frames.load(Ordering::SeqCst),
            audio_chunks_played: self.counters.chunks_played.load(Ordering::SeqCst),
            text_deltas: self.counters.text_deltas.load(Ordering::SeqCst),
        };

        info!(
            duration_secs = stats.duration_secs,
            chunks_sent = stats.chunks_sent,
            chunks_played = stats.audio_chunks_played,
            "live session finished"
        );

        Ok(stats)
    }
}
