use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;

#[test]
fn roll_fires_about_thirty_percent_of_the_time() {
    let mut rng = StdRng::seed_from_u64(7);
    let fired = (0..10_000).filter(|_| roll(&mut rng).is_some()).count();
    assert!((2_600..=3_400).contains(&fired), "fired {fired} times");
}

#[test]
fn roll_only_yields_canned_scenarios() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut titles = std::collections::HashSet::new();
    for _ in 0..2_000 {
        if let Some(notice) = roll(&mut rng) {
            assert!(SCENARIOS.iter().any(|(t, m, s)| *t == notice.title && *m == notice.message && *s == notice.severity));
            titles.insert(notice.title);
        }
    }
    assert_eq!(titles.len(), SCENARIOS.len());
}

#[tokio::test(start_paused = true)]
async fn simulator_publishes_on_its_interval() {
    let bus = EventBus::new(64);
    let mut rx = bus.receiver();
    let handle = spawn_simulator(bus.clone(), Duration::from_secs(45));

    // 100 ticks at 30% make at least one publish all but certain.
    tokio::time::sleep(Duration::from_secs(45 * 100 + 1)).await;
    handle.abort();

    let notice = rx.try_recv().expect("simulator should have published");
    assert!(SCENARIOS.iter().any(|(t, _, _)| *t == notice.title));
}
