//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the portal's business rules and repository access so
//! route handlers stay focused on request parsing, the access gate and
//! status codes. Every user-visible side effect is announced through the
//! [`notify::EventBus`].

pub mod announcements;
pub mod assistant;
pub mod attendance;
pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod directory;
pub mod events;
pub mod messaging;
pub mod notify;
pub mod simulator;
pub mod toast;

use std::fmt::Write;

use rand::Rng;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Random lowercase base-36 identifier of `len` characters.
#[must_use]
pub fn random_id(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect()
}

/// Random 32-byte hex token for session cookies.
#[must_use]
pub fn generate_session_key() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    let mut key = String::with_capacity(64);
    for b in bytes {
        let _ = write!(key, "{b:02x}");
    }
    key
}

/// Wall-clock `HH:MM` in UTC for message timestamps.
#[must_use]
pub fn clock_hhmm(at: time::OffsetDateTime) -> String {
    format!("{:02}:{:02}", at.hour(), at.minute())
}
