//! cpal-backed microphone and speaker streams.
//!
//! `cpal::Stream` is not `Send` on every platform, so each stream lives on a
//! dedicated thread and exchanges samples with the async side through a
//! queue. The capture thread converts device samples to i16 PCM; the
//! playback thread drains a shared queue into the device callback.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use super::{AudioBackend, MicStream, SpeakerStream};
use crate::error::DeviceError;

/// How often the device threads check their stop flag.
const STOP_POLL: Duration = Duration::from_millis(20);

/// How often a blocking speaker write checks whether the device has drained
/// the queue.
const DRAIN_POLL: Duration = Duration::from_millis(10);

/// Default audio backend built on cpal.
pub struct CpalBackend {
    shut_down: AtomicBool,
}

impl CpalBackend {
    pub fn new() -> Self {
        Self {
            shut_down: AtomicBool::new(false),
        }
    }
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioBackend for CpalBackend {
    async fn open_input(
        &self,
        sample_rate: u32,
        channels: u16,
        frame_samples: usize,
    ) -> Result<Box<dyn MicStream>, DeviceError> {
        let stream = CpalMicStream::open(sample_rate, channels, frame_samples)?;
        Ok(Box::new(stream))
    }

    async fn open_output(
        &self,
        sample_rate: u32,
        channels: u16,
    ) -> Result<Box<dyn SpeakerStream>, DeviceError> {
        let stream = CpalSpeakerStream::open(sample_rate, channels)?;
        Ok(Box::new(stream))
    }

    fn shutdown(&self) {
        if !self.shut_down.swap(true, Ordering::SeqCst) {
            debug!("cpal backend shut down");
        }
    }

    fn name(&self) -> &str {
        "cpal"
    }
}

fn backend_err(err: impl std::fmt::Display) -> DeviceError {
    DeviceError::Backend(err.to_string())
}

/// Microphone stream: a capture thread owns the cpal stream and feeds i16
/// batches into a bounded queue; `read_frame` reassembles fixed-size frames.
pub struct CpalMicStream {
    frame_bytes: usize,
    batch_rx: mpsc::Receiver<Vec<i16>>,
    pending: Vec<u8>,
    stop: Arc<AtomicBool>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl CpalMicStream {
    fn open(
        sample_rate: u32,
        channels: u16,
        frame_samples: usize,
    ) -> Result<Self, DeviceError> {
        let (batch_tx, batch_rx) = mpsc::channel::<Vec<i16>>(32);
        let stop = Arc::new(AtomicBool::new(false));
        let stop_thread = Arc::clone(&stop);
        let (init_tx, init_rx) = std::sync::mpsc::channel::<Result<(), DeviceError>>();

        let thread = std::thread::spawn(move || {
            let built = build_input_stream(sample_rate, channels, batch_tx);
            match built {
                Ok(stream) => {
                    let _ = init_tx.send(Ok(()));
                    while !stop_thread.load(Ordering::SeqCst) {
                        std::thread::sleep(STOP_POLL);
                    }
                    drop(stream);
                }
                Err(e) => {
                    let _ = init_tx.send(Err(e));
                }
            }
        });

        init_rx
            .recv()
            .map_err(|_| DeviceError::Backend("capture thread exited during init".to_string()))??;

        info!(sample_rate, channels, frame_samples, "microphone opened");

        Ok(Self {
            frame_bytes: frame_samples * 2,
            batch_rx,
            pending: Vec::new(),
            stop,
            thread: Some(thread),
        })
    }
}

fn build_input_stream(
    sample_rate: u32,
    channels: u16,
    batch_tx: mpsc::Sender<Vec<i16>>,
) -> Result<cpal::Stream, DeviceError> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or(DeviceError::NoInputDevice)?;

    let supported = device
        .supported_input_configs()
        .map_err(backend_err)?
        .filter(|c| {
            c.channels() == channels
                && c.min_sample_rate() <= SampleRate(sample_rate)
                && c.max_sample_rate() >= SampleRate(sample_rate)
        })
        .reduce(|best, c| {
            if c.sample_format() == SampleFormat::F32 {
                c
            } else {
                best
            }
        })
        .ok_or_else(|| DeviceError::Backend("no suitable input config found".to_string()))?;

    let config: StreamConfig = supported.with_sample_rate(SampleRate(sample_rate)).config();

    debug!(
        device = device.name().unwrap_or_default(),
        sample_rate, channels, "building input stream"
    );

    let stream = device
        .build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let batch: Vec<i16> = data
                    .iter()
                    .map(|s| (s * 32767.0).clamp(-32768.0, 32767.0) as i16)
                    .collect();
                // Overflow is tolerated by design: drop the batch when the
                // reader is behind.
                let _ = batch_tx.try_send(batch);
            },
            |err| error!(error = %err, "microphone stream error"),
            None,
        )
        .map_err(backend_err)?;

    stream.play().map_err(backend_err)?;

    Ok(stream)
}

#[async_trait]
impl MicStream for CpalMicStream {
    async fn read_frame(&mut self) -> Result<Vec<u8>, DeviceError> {
        while self.pending.len() < self.frame_bytes {
            match self.batch_rx.recv().await {
                Some(batch) => {
                    for sample in batch {
                        self.pending.extend_from_slice(&sample.to_le_bytes());
                    }
                }
                None => {
                    return Err(DeviceError::Backend(
                        "microphone capture thread stopped".to_string(),
                    ))
                }
            }
        }
        Ok(self.pending.drain(..self.frame_bytes).collect())
    }

    fn close(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
            debug!("microphone released");
        }
    }
}

impl Drop for CpalMicStream {
    fn drop(&mut self) {
        self.close();
    }
}

/// Speaker stream: the playback thread owns the cpal stream, whose callback
/// drains a shared sample queue; `write` enqueues a chunk and returns only
/// once the device has consumed it.
pub struct CpalSpeakerStream {
    queue: Arc<Mutex<VecDeque<i16>>>,
    stop: Arc<AtomicBool>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl CpalSpeakerStream {
    fn open(sample_rate: u32, channels: u16) -> Result<Self, DeviceError> {
        let queue: Arc<Mutex<VecDeque<i16>>> = Arc::new(Mutex::new(VecDeque::new()));
        let stop = Arc::new(AtomicBool::new(false));
        let queue_thread = Arc::clone(&queue);
        let stop_thread = Arc::clone(&stop);
        let (init_tx, init_rx) = std::sync::mpsc::channel::<Result<(), DeviceError>>();

        let thread = std::thread::spawn(move || {
            let built = build_output_stream(sample_rate, channels, queue_thread);
            match built {
                Ok(stream) => {
                    let _ = init_tx.send(Ok(()));
                    while !stop_thread.load(Ordering::SeqCst) {
                        std::thread::sleep(STOP_POLL);
                    }
                    drop(stream);
                }
                Err(e) => {
                    let _ = init_tx.send(Err(e));
                }
            }
        });

        init_rx
            .recv()
            .map_err(|_| DeviceError::Backend("playback thread exited during init".to_string()))??;

        info!(sample_rate, channels, "speaker opened");

        Ok(Self {
            queue,
            stop,
            thread: Some(thread),
        })
    }
}

fn build_output_stream(
    sample_rate: u32,
    channels: u16,
    queue: Arc<Mutex<VecDeque<i16>>>,
) -> Result<cpal::Stream, DeviceError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(DeviceError::NoOutputDevice)?;

    let rate_matches = |c: &cpal::SupportedStreamConfigRange| {
        c.min_sample_rate() <= SampleRate(sample_rate)
            && c.max_sample_rate() >= SampleRate(sample_rate)
    };

    let supported = device
        .supported_output_configs()
        .map_err(backend_err)?
        .find(|c| c.channels() == channels && rate_matches(c))
        .or_else(|| {
            // Fallback: let the device pick its channel count and duplicate
            // our mono samples across it.
            device
                .supported_output_configs()
                .ok()?
                .find(rate_matches)
        })
        .ok_or_else(|| DeviceError::Backend("no suitable output config found".to_string()))?;

    let config: StreamConfig = supported.with_sample_rate(SampleRate(sample_rate)).config();
    let out_channels = config.channels as usize;

    debug!(
        device = device.name().unwrap_or_default(),
        sample_rate,
        channels = out_channels,
        "building output stream"
    );

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let mut q = queue.lock().unwrap_or_else(|e| e.into_inner());
                for frame in data.chunks_mut(out_channels) {
                    let sample = match q.pop_front() {
                        Some(s) => f32::from(s) / 32768.0,
                        None => 0.0,
                    };
                    for out in frame.iter_mut() {
                        *out = sample;
                    }
                }
            },
            |err| error!(error = %err, "speaker stream error"),
            None,
        )
        .map_err(backend_err)?;

    stream.play().map_err(backend_err)?;

    Ok(stream)
}

#[async_trait]
impl SpeakerStream for CpalSpeakerStream {
    async fn write(&mut self, pcm: &[u8]) -> Result<(), DeviceError> {
        {
            let mut q = self.queue.lock().unwrap_or_else(|e| e.into_inner());
            for pair in pcm.chunks_exact(2) {
                q.push_back(i16::from_le_bytes([pair[0], pair[1]]));
            }
        }

        // Block until the device callback has drained the chunk.
        loop {
            if self.stop.load(Ordering::SeqCst) {
                return Ok(());
            }
            let remaining = self
                .queue
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .len();
            if remaining == 0 {
                return Ok(());
            }
            tokio::time::sleep(DRAIN_POLL).await;
        }
    }

    fn close(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
            debug!("speaker released");
        }
    }
}

impl Drop for CpalSpeakerStream {
    fn drop(&mut self) {
        self.close();
    }
}
