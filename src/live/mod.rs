//! Live endpoint abstraction
//!
//! The remote conversational endpoint is an opaque bidirectional stream of
//! typed messages: [`MediaChunk`]s go out, [`ServerEvent`]s come back. The
//! wire protocol behind it is a collaborator concern and lives entirely
//! behind the [`LiveClient`] trait.

mod client;
mod loopback;
mod messages;

pub use client::{LiveClient, LiveCloser, LiveHandle, LiveReceiver, LiveSender};
pub use loopback::LoopbackClient;
pub use messages::{
    ConnectConfig, MediaChunk, MediaResolution, ResponseModality, ServerEvent, TextDelta,
    AUDIO_MIME_TYPE, DEFAULT_VOICE, IMAGE_MIME_TYPE,
};
