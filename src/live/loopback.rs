//! In-process echo endpoint.
//!
//! Stands in for a real live endpoint in the demo binary and in tests:
//! audio chunks are echoed straight back as server audio, image chunks are
//! acknowledged with a text delta.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::client::{LiveClient, LiveCloser, LiveHandle, LiveReceiver, LiveSender};
use super::messages::{ConnectConfig, MediaChunk, ServerEvent};
use crate::error::{ConnectError, SendError, StreamError};

/// Client producing loopback connections.
pub struct LoopbackClient;

#[async_trait]
impl LiveClient for LoopbackClient {
    async fn connect(
        &self,
        model: &str,
        config: &ConnectConfig,
    ) -> Result<LiveHandle, ConnectError> {
        if model.trim().is_empty() {
            return Err(ConnectError::UnknownModel("<empty>".to_string()));
        }

        info!(model, voice = %config.voice, "loopback endpoint connected");

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let closed = Arc::new(AtomicBool::new(false));

        Ok(LiveHandle {
            sender: Box::new(LoopbackSender {
                event_tx,
                closed: Arc::clone(&closed),
                frames_seen: 0,
            }),
            receiver: Box::new(LoopbackReceiver { event_rx }),
            closer: Box::new(LoopbackCloser { closed }),
        })
    }
}

struct LoopbackSender {
    event_tx: mpsc::UnboundedSender<ServerEvent>,
    closed: Arc<AtomicBool>,
    frames_seen: usize,
}

#[async_trait]
impl LiveSender for LoopbackSender {
    async fn send(&mut self, chunk: MediaChunk) -> Result<(), SendError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SendError::ConnectionClosed);
        }

        let event = match chunk {
            MediaChunk::Audio { data } => ServerEvent::Audio(data),
            MediaChunk::Image { .. } => {
                self.frames_seen += 1;
                ServerEvent::Text(format!("[frame {} received] ", self.frames_seen))
            }
        };

        self.event_tx
            .send(event)
            .map_err(|_| SendError::ConnectionClosed)
    }
}

struct LoopbackReceiver {
    event_rx: mpsc::UnboundedReceiver<ServerEvent>,
}

#[async_trait]
impl LiveReceiver for LoopbackReceiver {
    async fn next_event(&mut self) -> Result<ServerEvent, StreamError> {
        match self.event_rx.recv().await {
            Some(event) => Ok(event),
            None => Err(StreamError::Disconnected),
        }
    }
}

struct LoopbackCloser {
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl LiveCloser for LoopbackCloser {
    async fn close(&mut self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            debug!("loopback connection closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn connected() -> LiveHandle {
        LoopbackClient
            .connect("echo-model", &ConnectConfig::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn empty_model_is_rejected() {
        let result = LoopbackClient
            .connect("  ", &ConnectConfig::default())
            .await;
        assert!(matches!(result, Err(ConnectError::UnknownModel(_))));
    }

    #[tokio::test]
    async fn audio_chunks_echo_back() {
        let mut handle = connected().await;

        handle
            .sender
            .send(MediaChunk::audio(vec![1, 2, 3]))
            .await
            .unwrap();

        let event = handle.receiver.next_event().await.unwrap();
        assert_eq!(event, ServerEvent::Audio(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn image_chunks_are_acknowledged_with_text() {
        let mut handle = connected().await;

        handle
            .sender
            .send(MediaChunk::jpeg("Zm9v".to_string()))
            .await
            .unwrap();

        match handle.receiver.next_event().await.unwrap() {
            ServerEvent::Text(text) => assert!(text.contains("frame 1")),
            other => panic!("expected text ack, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn close_is_idempotent_and_fails_later_sends() {
        let mut handle = connected().await;

        handle.closer.close().await;
        handle.closer.close().await;

        let result = handle.sender.send(MediaChunk::audio(vec![0])).await;
        assert!(matches!(result, Err(SendError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn dropping_the_sender_ends_the_stream() {
        let handle = connected().await;
        let LiveHandle {
            sender,
            mut receiver,
            ..
        } = handle;
        drop(sender);

        let result = receiver.next_event().await;
        assert!(matches!(result, Err(StreamError::Disconnected)));
    }
}
