//! Cross-generation repetition behavior of the word filter

use nameforge_gen::filter::FilterRejection;
use nameforge_gen::params::FilterParams;
use nameforge_gen::{ContentType, SeededRandom, WordFilter};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn filter(seed: u64) -> WordFilter {
    WordFilter::new(FilterParams::default(), Arc::new(SeededRandom::from_seed(seed)))
}

#[test]
fn test_batch_overlap_resets_between_generations() {
    let filter = filter(1);
    let t0 = Instant::now();

    let first = filter.start_new_generation_at(t0);
    filter.accept_at("Crimson Harbor", first, Some(ContentType::Band), t0);
    assert!(matches!(
        filter.check_at("Crimson Harbors", first, Some(ContentType::Band), t0),
        Some(FilterRejection::Batch(_))
    ));

    // Past the history horizon only the batch could object, and it was cleared
    let later = t0 + Duration::from_secs(3601);
    let second = filter.start_new_generation_at(later);
    assert_eq!(filter.check_at("Crimson Harbors", second, Some(ContentType::Band), later), None);
    assert_eq!(filter.stats_at(later).recent_words_count, 0);
}

#[test]
fn test_fifteen_minutes_later_only_extended_tier_applies() {
    let filter = filter(42);
    let t0 = Instant::now();
    let first = filter.start_new_generation_at(t0);
    filter.accept_at("Midnight Lanterns", first, Some(ContentType::Band), t0);

    let later = t0 + Duration::from_secs(15 * 60);
    let second = filter.start_new_generation_at(later);

    let trials = 2000;
    let mut rejected = 0;
    for _ in 0..trials {
        match filter.check_at("Midnight Engines", second, Some(ContentType::Band), later) {
            None => {}
            Some(FilterRejection::Extended { word }) => {
                assert_eq!(word, "midnight");
                rejected += 1;
            }
            Some(other) => panic!("unexpected rejection at 15 minutes: {}", other),
        }
    }

    let rate = rejected as f64 / trials as f64;
    assert!((0.25..0.35).contains(&rate), "extended rejection rate {}", rate);
}

#[test]
fn test_very_recent_word_rejected_for_same_type() {
    let filter = filter(3);
    let t0 = Instant::now();
    let first = filter.start_new_generation_at(t0);
    filter.accept_at("Velvet Thunder", first, Some(ContentType::Song), t0);

    let soon = t0 + Duration::from_secs(30);
    let second = filter.start_new_generation_at(soon);
    assert_eq!(
        filter.check_at("Velvet Morning", second, Some(ContentType::Song), soon),
        Some(FilterRejection::VeryRecent {
            word: "velvet".to_string(),
            cross_type: false,
        })
    );
}

#[test]
fn test_same_generation_history_is_ignored() {
    let filter = filter(5);
    let t0 = Instant::now();
    let id = filter.start_new_generation_at(t0);
    filter.accept_at("Silver Comets", id, None, t0);

    // One shared stem stays under the batch limit for a three-word name
    assert_eq!(filter.check_at("Silver Paper Tigers", id, None, t0), None);
}
