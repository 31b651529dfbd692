//! live-bridge: real-time duplex audio/video streaming against a
//! conversational live endpoint.
//!
//! A [`LiveSession`] captures microphone audio (and optionally camera or
//! screen frames), streams it to a remote endpoint through a [`LiveClient`],
//! and plays the endpoint's audio responses back in order, until the session
//! is cancelled or any of its loops stops.

pub mod audio;
pub mod config;
pub mod error;
pub mod live;
pub mod session;
pub mod video;

pub use config::Config;
pub use error::{ConnectError, DeviceError, InitError, SendError, StreamError};
pub use live::{LiveClient, LiveHandle, LoopbackClient, MediaChunk, ServerEvent, TextDelta};
pub use session::{CancelToken, LiveSession, SessionConfig, SessionStats};
pub use video::VideoMode;
