//! Event bus — typed, process-wide publish/subscribe for notifications.
//!
//! DESIGN
//! ======
//! One `EventBus` is built at startup and handed to every service through
//! `AppState`; nothing reaches it through a global. Publishing is
//! fire-and-forget over a bounded `tokio::sync::broadcast` channel:
//! with no subscriber the notice is dropped, and a subscriber that falls
//! more than `capacity` notices behind skips the backlog (logged at warn).
//!
//! `subscribe` drives a handler from a spawned task, one call per notice in
//! publish order. `receiver` hands out the raw stream for consumers that
//! own their own loop (the WebSocket route).

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::models::Severity;

/// One published notification before the toast center stamps it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

impl Notice {
    #[must_use]
    pub fn new(title: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self { title: title.into(), message: message.into(), severity }
    }
}

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Notice>,
}

impl EventBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Deliver `notice` to every current subscriber.
    pub fn publish(&self, notice: Notice) {
        debug!(title = %notice.title, severity = ?notice.severity, "publishing notice");
        if self.sender.send(notice).is_err() {
            debug!("no subscribers — notice dropped");
        }
    }

    /// Shorthand for `publish(Notice::new(..))`.
    pub fn emit(&self, title: impl Into<String>, message: impl Into<String>, severity: Severity) {
        self.publish(Notice::new(title, message, severity));
    }

    /// Raw ordered stream of notices published from now on.
    #[must_use]
    pub fn receiver(&self) -> broadcast::Receiver<Notice> {
        self.sender.subscribe()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Run `handler` once per notice published after this call returns.
    ///
    /// Must be called from within a Tokio runtime. Delivery stops when the
    /// returned [`Subscription`] is dropped.
    pub fn subscribe<F>(&self, mut handler: F) -> Subscription
    where
        F: FnMut(Notice) + Send + 'static,
    {
        let mut rx = self.sender.subscribe();
        let task = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(notice) => handler(notice),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "notification subscriber lagged — notices skipped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        Subscription { task }
    }
}

/// Handle for a running subscription.
pub struct Subscription {
    task: JoinHandle<()>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
#[path = "notify_test.rs"]
mod tests;
