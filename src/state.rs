//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! owns the repositories, the event bus, the toast center subscribed to that
//! bus, and the assistant. Every field is `Arc`-wrapped or cheaply `Clone`,
//! so handlers clone the state freely.

use std::sync::Arc;
use std::time::Duration;

use crate::services::assistant::Assistant;
use crate::services::notify::EventBus;
use crate::services::toast::ToastCenter;
use crate::store::{Repositories, SharedStore};

#[derive(Clone)]
pub struct AppState {
    pub repos: Arc<Repositories>,
    pub bus: EventBus,
    pub toasts: ToastCenter,
    pub assistant: Assistant,
    /// Mark the session cookie `Secure` (set behind HTTPS).
    pub cookie_secure: bool,
}

impl AppState {
    /// Build the state and attach the toast center to a fresh bus. Must be
    /// called from within a Tokio runtime.
    #[must_use]
    pub fn new(store: SharedStore, assistant: Assistant, bus_capacity: usize, toast_ttl: Duration) -> Self {
        let bus = EventBus::new(bus_capacity);
        let toasts = ToastCenter::attach(&bus, toast_ttl);
        Self { repos: Arc::new(Repositories::new(store)), bus, toasts, assistant, cookie_secure: false }
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
