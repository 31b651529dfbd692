use std::sync::Arc;

use tokio::sync::watch;

/// Clonable cooperative cancellation signal shared by every session loop.
///
/// Loops observe it with `tokio::select!` at their suspension points and
/// unwind promptly once it fires. Cancelling is idempotent.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Signal cancellation to every clone of this token.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once `cancel` has been called, immediately if it already was.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        // The sender lives inside every clone of the token, so wait_for can
        // only fail once cancellation is already observable.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn starts_uncancelled() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
    }

    #[tokio::test]
    async fn cancel_wakes_waiters_on_every_clone() {
        let token = CancelToken::new();
        let clone = token.clone();

        let waiter = tokio::spawn(async move { clone.cancelled().await });
        token.cancel();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should observe cancellation")
            .unwrap();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_resolves_immediately_after_the_fact() {
        let token = CancelToken::new();
        token.cancel();
        token.cancel();
        token.cancelled().await;
    }
}
