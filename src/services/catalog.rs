//! Static catalog — campuses, billing tiers and the lecture schedule, plus
//! the acknowledgement-only actions attached to them.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::notify::EventBus;
use crate::models::{Institution, PricingTier, Severity, SubscriptionTier, TimetableSlot};
use crate::seed;

/// Where a timetable export is headed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ExportTarget {
    Printing,
    Sharing,
}

impl fmt::Display for ExportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Printing => "Printing",
            Self::Sharing => "Sharing",
        })
    }
}

#[must_use]
pub fn institutions() -> Vec<Institution> {
    seed::institutions()
}

#[must_use]
pub fn pricing() -> Vec<PricingTier> {
    seed::pricing_tiers()
}

#[must_use]
pub fn timetable() -> Vec<TimetableSlot> {
    seed::timetable()
}

/// The weekly grid: every day and hour row, plus the booked slots.
#[derive(Debug, Clone, Serialize)]
pub struct TimetableGrid {
    pub days: &'static [&'static str],
    pub hours: &'static [&'static str],
    pub slots: Vec<TimetableSlot>,
}

#[must_use]
pub fn timetable_grid() -> TimetableGrid {
    TimetableGrid { days: &seed::TIMETABLE_DAYS, hours: &seed::TIMETABLE_HOURS, slots: timetable() }
}

/// The scheduled lecture at `day`/`time`, announcing who leads it.
#[must_use]
pub fn open_slot(bus: &EventBus, day: &str, time: &str) -> Option<TimetableSlot> {
    let slot = timetable().into_iter().find(|s| s.day == day && s.time == time)?;
    bus.emit(slot.subject, format!("Class led by {} in {}", slot.teacher, slot.room), Severity::Info);
    Some(slot)
}

pub fn consolidate_billing(bus: &EventBus) {
    bus.emit("Billing Update", "Consolidated invoices generated for all institutions.", Severity::Info);
}

pub fn export_timetable(bus: &EventBus, target: ExportTarget) {
    bus.emit("Timetable Export", format!("Your schedule is being prepared for {target}..."), Severity::Info);
}

pub fn select_plan(bus: &EventBus, tier: SubscriptionTier) {
    bus.emit(
        "Subscription Update",
        format!("Processing your request for the {tier} plan. A representative will contact you soon."),
        Severity::Success,
    );
}

pub fn request_demo(bus: &EventBus, kind: &str) {
    bus.emit("Demo Requested", format!("Thank you! We've received your request for a {kind} demo."), Severity::Info);
}

pub fn open_support(bus: &EventBus) {
    bus.emit("Support Chat", "An agent will be with you shortly.", Severity::Info);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogs_come_from_seed() {
        assert_eq!(institutions().len(), 4);
        let tiers: Vec<SubscriptionTier> = pricing().into_iter().map(|p| p.tier).collect();
        assert_eq!(tiers, vec![SubscriptionTier::Starter, SubscriptionTier::Professional, SubscriptionTier::Enterprise]);
        assert!(timetable().iter().all(|s| seed::TIMETABLE_DAYS.contains(&s.day)));
    }

    #[test]
    fn every_booked_slot_sits_on_the_grid() {
        let grid = timetable_grid();
        assert_eq!((grid.days.len(), grid.hours.len()), (5, 7));
        assert!(grid.slots.iter().all(|s| grid.days.contains(&s.day) && grid.hours.contains(&s.time)));
    }

    #[tokio::test]
    async fn actions_publish_their_notices() {
        let bus = EventBus::new(16);
        let mut rx = bus.receiver();

        consolidate_billing(&bus);
        export_timetable(&bus, ExportTarget::Sharing);
        select_plan(&bus, SubscriptionTier::Enterprise);
        request_demo(&bus, "District");
        open_support(&bus);

        let got: Vec<(String, String)> = std::iter::from_fn(|| rx.try_recv().ok()).map(|n| (n.title, n.message)).collect();
        assert_eq!(got[0].0, "Billing Update");
        assert_eq!(got[1].1, "Your schedule is being prepared for Sharing...");
        assert_eq!(
            got[2].1,
            "Processing your request for the Enterprise plan. A representative will contact you soon."
        );
        assert_eq!(got[3].1, "Thank you! We've received your request for a District demo.");
        assert_eq!(got[4], ("Support Chat".to_owned(), "An agent will be with you shortly.".to_owned()));
    }

    #[tokio::test]
    async fn open_slot_names_teacher_and_room() {
        let bus = EventBus::new(4);
        let mut rx = bus.receiver();
        let slot = open_slot(&bus, "Tuesday", "10:00").unwrap();
        assert_eq!(slot.subject, "History");
        assert_eq!(rx.try_recv().unwrap().message, "Class led by Ms. Modise in Room 12");

        assert!(open_slot(&bus, "Friday", "08:00").is_none());
        assert!(rx.try_recv().is_err());
    }
}
