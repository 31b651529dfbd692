use thiserror::Error;

/// Fatal initialization failures.
///
/// These are the only errors [`LiveSession::run`](crate::LiveSession::run)
/// returns: everything that goes wrong after the loops have been spawned is
/// logged inside the failing loop and absorbed into session teardown.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("failed to connect to live endpoint: {0}")]
    Connect(#[from] ConnectError),

    #[error("failed to open microphone: {0}")]
    Microphone(#[from] DeviceError),
}

/// Connection establishment failures reported by a live endpoint client.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("missing or invalid credentials")]
    Credentials,

    #[error("unknown model: {0}")]
    UnknownModel(String),

    #[error("transport failure: {0}")]
    Transport(String),
}

/// Failure to forward a chunk over an established connection.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("connection is closed")]
    ConnectionClosed,

    #[error("transport failure: {0}")]
    Transport(String),
}

/// Unrecoverable failure of the inbound response stream.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("remote endpoint disconnected")]
    Disconnected,

    #[error("transport failure: {0}")]
    Transport(String),
}

/// Local device (microphone, speaker, camera, screen) failures.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("no input device available")]
    NoInputDevice,

    #[error("no output device available")]
    NoOutputDevice,

    #[error("device backend error: {0}")]
    Backend(String),
}
