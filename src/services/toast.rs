//! Toast center — the bus subscriber that keeps the live notification list.
//!
//! Each delivered notice becomes an [`AppNotification`] with a random
//! 9-character id and a creation timestamp, prepended so the list reads
//! newest first. A timer removes it after the TTL; `dismiss` removes it
//! earlier and the timer then finds nothing to do.

use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use time::OffsetDateTime;
use tracing::debug;

use super::notify::{EventBus, Notice, Subscription};
use super::random_id;
use crate::models::AppNotification;

pub const DEFAULT_TOAST_TTL_SECS: u64 = 6;
const TOAST_ID_LEN: usize = 9;

#[derive(Clone)]
pub struct ToastCenter {
    inner: Arc<Inner>,
    _subscription: Arc<Subscription>,
}

struct Inner {
    toasts: Mutex<Vec<AppNotification>>,
    ttl: Duration,
}

impl ToastCenter {
    /// Subscribe a new toast center to `bus`. Must be called from within a
    /// Tokio runtime.
    #[must_use]
    pub fn attach(bus: &EventBus, ttl: Duration) -> Self {
        let inner = Arc::new(Inner { toasts: Mutex::new(Vec::new()), ttl });
        let weak = Arc::downgrade(&inner);
        let subscription = bus.subscribe(move |notice| {
            if let Some(inner) = weak.upgrade() {
                Inner::receive(&inner, notice);
            }
        });
        Self { inner, _subscription: Arc::new(subscription) }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// Live notifications, newest first.
    #[must_use]
    pub fn list(&self) -> Vec<AppNotification> {
        self.inner.lock().clone()
    }

    /// Remove `id` now. Returns whether it was still live.
    pub fn dismiss(&self, id: &str) -> bool {
        self.inner.remove(id)
    }
}

impl Inner {
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<AppNotification>> {
        self.toasts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn receive(this: &Arc<Self>, notice: Notice) {
        let toast = AppNotification {
            id: random_id(TOAST_ID_LEN),
            title: notice.title,
            message: notice.message,
            severity: notice.severity,
            timestamp: OffsetDateTime::now_utc(),
        };
        let id = toast.id.clone();
        this.lock().insert(0, toast);

        let weak: Weak<Self> = Arc::downgrade(this);
        let ttl = this.ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Some(inner) = weak.upgrade() {
                if inner.remove(&id) {
                    debug!(%id, "toast expired");
                }
            }
        });
    }

    fn remove(&self, id: &str) -> bool {
        let mut toasts = self.lock();
        let before = toasts.len();
        toasts.retain(|t| t.id != id);
        toasts.len() != before
    }
}

#[cfg(test)]
#[path = "toast_test.rs"]
mod tests;
