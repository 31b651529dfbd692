//! Session orchestration: configuration, lifecycle, cancellation, stats.

mod cancel;
mod config;
mod loops;
mod session;
mod stats;

pub use cancel::CancelToken;
pub use config::SessionConfig;
pub use session::LiveSession;
pub use stats::SessionStats;
