//! The session's concurrent loop bodies.
//!
//! Every loop catches whatever can go wrong inside it, logs it, and turns it
//! into a clean termination; nothing escapes a loop boundary except the fact
//! that it stopped. Each loop releases the device it privately owns before
//! returning.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use super::cancel::CancelToken;
use super::stats::SessionCounters;
use crate::audio::{AudioBackend, MicStream};
use crate::live::{LiveReceiver, LiveSender, MediaChunk, ServerEvent, TextDelta};
use crate::video::{encode, FrameSource};

/// Microphone frames → outbound channel. The bounded push is the session's
/// backpressure point: a slow transmitter throttles capture.
pub(crate) async fn capture_audio(
    mut mic: Box<dyn MicStream>,
    out: mpsc::Sender<MediaChunk>,
    counters: Arc<SessionCounters>,
    cancel: CancelToken,
) {
    info!("audio capture loop started");
    loop {
        let frame = tokio::select! {
            _ = cancel.cancelled() => break,
            frame = mic.read_frame() => frame,
        };
        let pcm = match frame {
            Ok(pcm) => pcm,
            Err(e) => {
                error!(error = %e, "microphone read failed");
                break;
            }
        };
        counters.frames_captured.fetch_add(1, Ordering::SeqCst);

        let pushed = tokio::select! {
            _ = cancel.cancelled() => break,
            res = out.send(MediaChunk::audio(pcm)) => res,
        };
        if pushed.is_err() {
            // Transmitter is gone; nothing left to produce for.
            break;
        }
    }
    mic.close();
    info!("audio capture loop stopped");
}

/// Camera/screen frames → encode → outbound channel, at a fixed cadence.
pub(crate) async fn capture_video(
    mut source: Box<dyn FrameSource>,
    out: mpsc::Sender<MediaChunk>,
    interval: Duration,
    counters: Arc<SessionCounters>,
    cancel: CancelToken,
) {
    info!(source = source.name(), "video capture loop started");
    loop {
        let frame = match source.grab() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                info!(source = source.name(), "no frame from video source, stopping");
                break;
            }
            Err(e) => {
                error!(error = %e, "video frame acquisition failed");
                break;
            }
        };

        let chunk = match encode::frame_to_chunk(frame) {
            Ok(chunk) => chunk,
            Err(e) => {
                error!(error = %e, "frame encoding failed");
                break;
            }
        };

        let pushed = tokio::select! {
            _ = cancel.cancelled() => break,
            res = out.send(chunk) => res,
        };
        if pushed.is_err() {
            break;
        }
        counters.video_frames.fetch_add(1, Ordering::SeqCst);

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
    source.close();
    info!("video capture loop stopped");
}

/// Outbound channel → endpoint, one chunk per send, in arrival order.
pub(crate) async fn transmit(
    mut out_rx: mpsc::Receiver<MediaChunk>,
    mut sender: Box<dyn LiveSender>,
    counters: Arc<SessionCounters>,
    cancel: CancelToken,
) {
    info!("transmit loop started");
    loop {
        let chunk = tokio::select! {
            _ = cancel.cancelled() => break,
            chunk = out_rx.recv() => chunk,
        };
        let Some(chunk) = chunk else {
            // Every producer has stopped.
            break;
        };

        if let Err(e) = sender.send(chunk).await {
            error!(error = %e, "send to live endpoint failed");
            break;
        }
        counters.chunks_sent.fetch_add(1, Ordering::SeqCst);
    }
    info!("transmit loop stopped");
}

/// Endpoint response stream → inbound audio channel + text side channel.
///
/// A finished turn does not end the loop; only cancellation or a stream
/// error does. The inbound channel is unbounded, so pushing never stalls
/// this loop on playback speed.
pub(crate) async fn receive(
    mut receiver: Box<dyn LiveReceiver>,
    audio_tx: mpsc::UnboundedSender<Vec<u8>>,
    text_tx: mpsc::UnboundedSender<TextDelta>,
    counters: Arc<SessionCounters>,
    cancel: CancelToken,
) {
    info!("receive loop started");
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = receiver.next_event() => event,
        };
        match event {
            Ok(ServerEvent::Audio(data)) => {
                if audio_tx.send(data).is_err() {
                    // Playback is gone.
                    break;
                }
            }
            Ok(ServerEvent::Text(text)) => {
                counters.text_deltas.fetch_add(1, Ordering::SeqCst);
                // Display side channel: fire and forget.
                let _ = text_tx.send(TextDelta::now(text));
            }
            Ok(ServerEvent::TurnComplete) => {
                debug!("turn complete, reading next turn");
            }
            Err(e) => {
                error!(error = %e, "live response stream failed");
                break;
            }
        }
    }
    info!("receive loop stopped");
}

/// Inbound audio channel → speaker, strictly FIFO.
///
/// The in-progress write is never abandoned on cancellation; pending queued
/// chunks are discarded, not flushed.
pub(crate) async fn play(
    backend: Arc<dyn AudioBackend>,
    sample_rate: u32,
    channels: u16,
    mut audio_rx: mpsc::UnboundedReceiver<Vec<u8>>,
    counters: Arc<SessionCounters>,
    cancel: CancelToken,
) {
    let mut speaker = match backend.open_output(sample_rate, channels).await {
        Ok(speaker) => speaker,
        Err(e) => {
            error!(error = %e, "failed to open speaker");
            return;
        }
    };

    info!("playback loop started");
    loop {
        let chunk = tokio::select! {
            _ = cancel.cancelled() => break,
            chunk = audio_rx.recv() => chunk,
        };
        let Some(pcm) = chunk else {
            // Receiver is gone.
            break;
        };

        if let Err(e) = speaker.write(&pcm).await {
            error!(error = %e, "speaker write failed");
            break;
        }
        counters.chunks_played.fetch_add(1, Ordering::SeqCst);
    }
    speaker.close();
    info!("playback loop stopped");
}
