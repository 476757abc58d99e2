//! Notification simulator — cosmetic background chatter.
//!
//! Every interval, with 30 % probability, publishes one of four canned
//! notices as if another staff member had acted. Off unless
//! `SIMULATOR_ENABLED` is set.

use std::time::Duration;

use rand::Rng;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;

use super::notify::{EventBus, Notice};
use crate::models::Severity;

pub const DEFAULT_SIMULATOR_INTERVAL_SECS: u64 = 45;
const FIRE_PROBABILITY: f64 = 0.3;

const SCENARIOS: [(&str, &str, Severity); 4] = [
    ("📢 New Announcement", "Mr. Khumalo posted a new study guide for Term 3.", Severity::Info),
    ("🗓️ Schedule Update", "Mathematics class moved to Room 12 today.", Severity::Alert),
    ("💬 New Message", "You have an unread message from Ms. Modise.", Severity::Success),
    ("🏫 Admin Notice", "School will close early on Friday for staff development.", Severity::Info),
];

/// One simulator tick: `Some` notice 30 % of the time.
pub fn roll(rng: &mut impl Rng) -> Option<Notice> {
    if !rng.random_bool(FIRE_PROBABILITY) {
        return None;
    }
    let (title, message, severity) = SCENARIOS[rng.random_range(0..SCENARIOS.len())];
    Some(Notice::new(title, message, severity))
}

/// Spawn the simulator loop. The first roll happens one interval after start.
pub fn spawn_simulator(bus: EventBus, interval: Duration) -> JoinHandle<()> {
    info!(interval_secs = interval.as_secs(), "notification simulator enabled");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let notice = roll(&mut rand::rng());
            if let Some(notice) = notice {
                bus.publish(notice);
            }
        }
    })
}

#[cfg(test)]
#[path = "simulator_test.rs"]
mod tests;
