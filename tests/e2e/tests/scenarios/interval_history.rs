//! # Interval History Scenarios
//!
//! Due-date sequences produced by the state machine over whole review
//! histories: graduation, lapses, relearning, the interval cap and fuzzing.

use cadence_core::{
    Card, FsrsCalculator, Rating, Scheduler, SchedulerConfig, State, fuzz_range,
};
use cadence_e2e_tests::mocks::{LowerBoundFuzzer, TestDataFactory};
use chrono::Duration;

fn graduated_card(scheduler: &Scheduler) -> Card {
    let start = TestDataFactory::scenario_start();
    scheduler
        .review_card(&Card::created_at(start), Rating::Easy, start, None)
        .unwrap()
        .card
}

// ============================================================================
// REFERENCE SEQUENCE
// ============================================================================

#[test]
fn test_reviews_on_due_date_reference_intervals() {
    let scheduler = TestDataFactory::unfuzzed_scheduler();
    let mut ratings = vec![Rating::Good; 6];
    ratings.extend([Rating::Again, Rating::Again]);
    ratings.extend([Rating::Good; 5]);

    let card = Card::created_at(TestDataFactory::scenario_start());
    let results = TestDataFactory::run_when_due(&scheduler, card, &ratings);

    assert_eq!(
        TestDataFactory::interval_days(&results),
        vec![0, 2, 11, 46, 163, 498, 0, 0, 2, 4, 7, 12, 21]
    );

    let states: Vec<State> = results.iter().map(|r| r.card.state()).collect();
    assert_eq!(states[0], State::Learning);
    assert_eq!(states[5], State::Review);
    assert_eq!(states[6], State::Relearning);
    assert_eq!(states[7], State::Relearning);
    assert_eq!(states[8], State::Review);
}

#[test]
fn test_logs_follow_review_order() {
    let scheduler = TestDataFactory::unfuzzed_scheduler();
    let card = Card::created_at(TestDataFactory::scenario_start());
    let id = card.id();
    let results = TestDataFactory::run_when_due(&scheduler, card, &[Rating::Good; 5]);

    for pair in results.windows(2) {
        assert!(pair[0].review_log.review_datetime() < pair[1].review_log.review_datetime());
    }
    assert!(results.iter().all(|r| r.review_log.card_id() == id));
    assert!(results.iter().all(|r| r.card.id() == id));
}

// ============================================================================
// RELEARNING
// ============================================================================

#[test]
fn test_lapse_without_relearning_steps_stays_in_review() {
    let scheduler = TestDataFactory::scheduler_with(SchedulerConfig {
        relearning_steps: vec![],
        ..TestDataFactory::unfuzzed_config()
    });
    let card = graduated_card(&scheduler);
    assert_eq!(card.state(), State::Review);

    let lapse = scheduler
        .review_card(&card, Rating::Again, card.due(), None)
        .unwrap();
    assert_eq!(lapse.card.state(), State::Review);
    assert_eq!(lapse.card.step(), None);
    assert!(lapse.interval() >= Duration::days(1));
    assert!(lapse.card.stability().unwrap() < card.stability().unwrap());
}

#[test]
fn test_relearning_journey() {
    let scheduler = TestDataFactory::unfuzzed_scheduler();
    let card = graduated_card(&scheduler);

    let lapse = scheduler
        .review_card(&card, Rating::Again, card.due(), None)
        .unwrap();
    assert_eq!(lapse.card.state(), State::Relearning);
    assert_eq!(lapse.card.step(), Some(0));
    assert_eq!(lapse.interval(), Duration::minutes(10));

    // One relearning step: Hard waits one and a half steps
    let relearning = lapse.card;
    let hard = scheduler
        .review_card(&relearning, Rating::Hard, relearning.due(), None)
        .unwrap();
    assert_eq!(hard.card.state(), State::Relearning);
    assert_eq!(hard.card.step(), Some(0));
    assert_eq!(hard.interval(), Duration::seconds(900));

    let again = scheduler
        .review_card(&relearning, Rating::Again, relearning.due(), None)
        .unwrap();
    assert_eq!(again.card.state(), State::Relearning);
    assert_eq!(again.interval(), Duration::minutes(10));

    let good = scheduler
        .review_card(&relearning, Rating::Good, relearning.due(), None)
        .unwrap();
    assert_eq!(good.card.state(), State::Review);
    assert_eq!(good.card.step(), None);
    assert!(good.interval() >= Duration::days(1));
}

#[test]
fn test_multi_step_relearning() {
    let scheduler = TestDataFactory::scheduler_with(SchedulerConfig {
        relearning_steps: vec![Duration::minutes(5), Duration::minutes(30)],
        ..TestDataFactory::unfuzzed_config()
    });
    let card = graduated_card(&scheduler);
    let relearning = scheduler
        .review_card(&card, Rating::Again, card.due(), None)
        .unwrap()
        .card;

    let hard = scheduler
        .review_card(&relearning, Rating::Hard, relearning.due(), None)
        .unwrap();
    assert_eq!(hard.interval(), Duration::seconds(1050));

    let good = scheduler
        .review_card(&relearning, Rating::Good, relearning.due(), None)
        .unwrap();
    assert_eq!(good.card.state(), State::Relearning);
    assert_eq!(good.card.step(), Some(1));
    assert_eq!(good.interval(), Duration::minutes(30));

    let easy = scheduler
        .review_card(&relearning, Rating::Easy, relearning.due(), None)
        .unwrap();
    assert_eq!(easy.card.state(), State::Review);
}

// ============================================================================
// LIMITS
// ============================================================================

#[test]
fn test_intervals_capped_at_maximum() {
    let scheduler = TestDataFactory::scheduler_with(SchedulerConfig {
        maximum_interval: 100,
        ..TestDataFactory::unfuzzed_config()
    });
    let card = Card::created_at(TestDataFactory::scenario_start());
    let results = TestDataFactory::run_when_due(&scheduler, card, &[Rating::Easy; 8]);
    let days = TestDataFactory::interval_days(&results);

    assert!(days.iter().all(|&d| (1..=100).contains(&d)));
    assert_eq!(*days.last().unwrap(), 100);
    // Stability keeps growing past the cap
    let last = &results.last().unwrap().card;
    assert!(last.stability().unwrap() > 100.0);
}

#[test]
fn test_lower_retention_means_longer_intervals() {
    let interval_for = |retention: f64| {
        let scheduler = TestDataFactory::scheduler_with(SchedulerConfig {
            desired_retention: retention,
            ..TestDataFactory::unfuzzed_config()
        });
        let start = TestDataFactory::scenario_start();
        scheduler
            .review_card(&Card::created_at(start), Rating::Easy, start, None)
            .unwrap()
            .interval()
    };

    assert_eq!(interval_for(0.9), Duration::days(8));
    assert!(interval_for(0.7) > interval_for(0.9));
    assert!(interval_for(0.97) < interval_for(0.9));
}

// ============================================================================
// FUZZING
// ============================================================================

#[test]
fn test_fuzz_applies_to_review_only() {
    let config = SchedulerConfig::default();
    let calculator = FsrsCalculator::new(config.parameters.clone());
    let scheduler = Scheduler::with_components(config, calculator, LowerBoundFuzzer).unwrap();
    let start = TestDataFactory::scenario_start();
    let card = Card::created_at(start);

    let learning = scheduler.review_card(&card, Rating::Good, start, None).unwrap();
    assert_eq!(learning.interval(), Duration::minutes(10));

    // Unfuzzed this would be 8 days
    let review = scheduler.review_card(&card, Rating::Easy, start, None).unwrap();
    let (low, _) = fuzz_range(8.0, 36500).unwrap();
    assert_eq!(review.interval(), Duration::days(i64::from(low)));
    assert_eq!(low, 6);
}

#[test]
fn test_fuzz_disabled_ignores_fuzzer() {
    let config = TestDataFactory::unfuzzed_config();
    let calculator = FsrsCalculator::new(config.parameters.clone());
    let scheduler = Scheduler::with_components(config, calculator, LowerBoundFuzzer).unwrap();
    let card = graduated_card(&scheduler);
    assert_eq!(
        card.due() - TestDataFactory::scenario_start(),
        Duration::days(8)
    );
}

#[test]
fn test_random_fuzz_stays_in_range() {
    let scheduler = Scheduler::new(SchedulerConfig::default()).unwrap();
    let start = TestDataFactory::scenario_start();
    let card = Card::created_at(start);
    let (low, high) = fuzz_range(8.0, 36500).unwrap();

    for _ in 0..50 {
        let days = scheduler
            .review_card(&card, Rating::Easy, start, None)
            .unwrap()
            .interval()
            .num_days();
        assert!((i64::from(low)..=i64::from(high)).contains(&days));
    }
}
