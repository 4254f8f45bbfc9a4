//! Execution context for data-access operations
//!
//! Every repository operation takes a [`QueryContext`]. The context carries an
//! optional deadline and a cancellation signal shared by all of its clones.
//! Adapters wrap their store calls in [`QueryContext::run`] so in-flight work is
//! abandoned as soon as either fires.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::domain::DomainError;

/// Cancellation and deadline carrier passed to every operation
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

/// Handle used to cancel a [`QueryContext`] and all of its clones
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    /// Signal cancellation to every context derived from this handle
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

impl QueryContext {
    /// A context that never expires and is never cancelled
    pub fn background() -> Self {
        Self::default()
    }

    /// Create a cancellable context together with its cancel handle
    pub fn cancellable() -> (Self, CancelHandle) {
        Self::background().with_cancel()
    }

    /// Attach a fresh cancellation signal to this context
    pub fn with_cancel(mut self) -> (Self, CancelHandle) {
        let (sender, receiver) = watch::channel(false);
        self.cancel = Some(receiver);
        (self, CancelHandle { sender })
    }

    /// Limit the context to `timeout` from now. An earlier deadline is kept.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Limit the context to an absolute deadline. An earlier deadline is kept.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Fail fast when the context is already cancelled or expired
    pub fn check(&self) -> Result<(), DomainError> {
        if self.is_cancelled() {
            return Err(DomainError::Cancelled);
        }

        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(DomainError::DeadlineExceeded);
            }
        }

        Ok(())
    }

    /// Drive `operation` to completion unless the context is cancelled or its
    /// deadline passes first. The operation future is dropped in that case.
    pub async fn run<F, T>(&self, operation: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        self.check()?;

        let cancelled = wait_for_cancel(self.cancel.clone());
        let expired = wait_for_deadline(self.deadline);

        tokio::select! {
            result = operation => result,
            _ = cancelled => Err(DomainError::Cancelled),
            _ = expired => Err(DomainError::DeadlineExceeded),
        }
    }
}

async fn wait_for_cancel(receiver: Option<watch::Receiver<bool>>) {
    let Some(mut receiver) = receiver else {
        return std::future::pending().await;
    };

    let signalled = receiver.wait_for(|cancelled| *cancelled).await.map(|_| ());

    // Handle dropped without cancelling: the context can no longer be cancelled
    if signalled.is_err() {
        std::future::pending::<()>().await;
    }
}

async fn wait_for_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
