use async_trait::async_trait;

use super::messages::{ConnectConfig, MediaChunk, ServerEvent};
use crate::error::{ConnectError, SendError, StreamError};

/// Write half of an open live connection.
///
/// The transmitter loop is the sole writer for the connection's lifetime;
/// exclusive ownership of this half enforces that without a lock.
#[async_trait]
pub trait LiveSender: Send {
    /// Forward one chunk to the endpoint. One chunk in, one send out.
    async fn send(&mut self, chunk: MediaChunk) -> Result<(), SendError>;
}

/// Read half of an open live connection, owned by the receiver loop.
#[async_trait]
pub trait LiveReceiver: Send {
    /// Next unit of the response stream, blocking until one arrives.
    ///
    /// [`ServerEvent::TurnComplete`] marks a turn boundary; the stream
    /// continues with the next turn. An error is unrecoverable.
    async fn next_event(&mut self) -> Result<ServerEvent, StreamError>;
}

/// Teardown handle for an open live connection, retained by the orchestrator.
#[async_trait]
pub trait LiveCloser: Send {
    /// Close the connection. Safe to call more than once.
    async fn close(&mut self);
}

/// An open connection to the remote live endpoint, split by ownership:
/// the sender moves into the transmitter, the receiver into the receive
/// loop, and the closer stays with the session orchestrator.
pub struct LiveHandle {
    pub sender: Box<dyn LiveSender>,
    pub receiver: Box<dyn LiveReceiver>,
    pub closer: Box<dyn LiveCloser>,
}

/// A live endpoint the session can connect to.
///
/// The wire protocol is entirely the implementor's concern; the session only
/// sees typed chunks going out and typed events coming back.
#[async_trait]
pub trait LiveClient: Send + Sync {
    async fn connect(
        &self,
        model: &str,
        config: &ConnectConfig,
    ) -> Result<LiveHandle, ConnectError>;
}
