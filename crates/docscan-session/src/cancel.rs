// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cooperative cancellation for scan sessions.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

/// Requests cancellation. Cloning shares the same signal.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

/// Observes cancellation from inside the session.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

/// A connected handle and token, not yet cancelled.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx: Arc::new(tx) }, CancelToken { rx })
}

impl CancelHandle {
    /// Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested. Never resolves if every
    /// handle is dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Run `fut` unless cancellation comes first. Cancellation wins ties, so
    /// a result that becomes ready after `cancel()` is dropped.
    pub async fn run_until_cancelled<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.cancelled() => None,
            output = fut => Some(output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn completes_when_not_cancelled() {
        let (_handle, token) = cancel_pair();
        assert_eq!(token.run_until_cancelled(async { 42 }).await, Some(42));
    }

    #[tokio::test]
    async fn cancel_interrupts_a_pending_future() {
        let (handle, token) = cancel_pair();
        let task = tokio::spawn(async move {
            token
                .run_until_cancelled(std::future::pending::<()>())
                .await
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.cancel();
        assert_eq!(task.await.unwrap(), None);
    }

    #[tokio::test]
    async fn cancellation_beats_a_ready_result() {
        let (handle, token) = cancel_pair();
        handle.cancel();
        handle.cancel();
        assert!(token.is_cancelled() && handle.is_cancelled());
        assert_eq!(token.run_until_cancelled(async { "late" }).await, None);
    }

    #[tokio::test]
    async fn dropped_handle_never_cancels() {
        let (handle, token) = cancel_pair();
        drop(handle);
        let out = token
            .run_until_cancelled(async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                "done"
            })
            .await;
        assert_eq!(out, Some("done"));
    }
}
