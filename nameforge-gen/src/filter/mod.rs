//! Word filter (repetition guard)
//!
//! Process-wide, time-decaying memory of the words used in accepted names.
//!
//! - Within a batch: `BatchGate` refuses duplicates and heavy stem overlap
//! - Across batches: words (by stem) accepted in earlier generations are
//!   refused with a probability that decays with age:
//!   - very recent window: always for the same content type, otherwise
//!     `cross_type_reject_probability`
//!   - recent window: `recent_reject_probability`
//!   - up to the history horizon: `extended_reject_probability`
//!
//! One probability roll is made per candidate, using its youngest colliding
//! word. All state sits behind one mutex that is never held across an await.

pub mod gate;
pub mod stemmer;

use crate::params::FilterParams;
use crate::random::{RandomExt, RandomSource};
use crate::types::ContentType;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, info};
use uuid::Uuid;

pub use gate::{BatchGate, GateRejection};
pub use stemmer::{significant_words, stem};

/// One remembered word
#[derive(Debug, Clone)]
pub struct WordTrackingEntry {
    pub word: String,
    pub stem: String,
    pub timestamp: Instant,
    pub generation_id: Uuid,
    pub content_type: Option<ContentType>,
}

/// Why a candidate was refused
#[derive(Debug, Clone, PartialEq)]
pub enum FilterRejection {
    Batch(GateRejection),
    VeryRecent { word: String, cross_type: bool },
    Recent { word: String },
    Extended { word: String },
}

impl fmt::Display for FilterRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterRejection::Batch(reason) => write!(f, "batch: {}", reason),
            FilterRejection::VeryRecent { word, cross_type } => {
                write!(f, "'{}' used very recently (cross type: {})", word, cross_type)
            }
            FilterRejection::Recent { word } => write!(f, "'{}' used recently", word),
            FilterRejection::Extended { word } => write!(f, "'{}' used within the hour", word),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterStats {
    pub recent_words_count: usize,
    pub current_generation_words_count: usize,
    /// Zero when history is empty
    pub oldest_word_age_minutes: u64,
    pub generation_id: Option<Uuid>,
}

/// History for one stem
#[derive(Debug, Clone)]
struct StemHistory {
    latest: WordTrackingEntry,
    /// Youngest use from a generation other than `latest`'s
    earlier: Option<WordTrackingEntry>,
}

impl StemHistory {
    fn new(entry: WordTrackingEntry) -> Self {
        Self {
            latest: entry,
            earlier: None,
        }
    }

    fn record(&mut self, entry: WordTrackingEntry) {
        if entry.generation_id == self.latest.generation_id {
            self.latest = entry;
        } else {
            self.earlier = Some(std::mem::replace(&mut self.latest, entry));
        }
    }

    /// Youngest use outside `generation_id`
    fn outside(&self, generation_id: Uuid) -> Option<&WordTrackingEntry> {
        if self.latest.generation_id != generation_id {
            Some(&self.latest)
        } else {
            self.earlier.as_ref()
        }
    }

    fn oldest(&self) -> Instant {
        self.earlier
            .as_ref()
            .map_or(self.latest.timestamp, |e| e.timestamp.min(self.latest.timestamp))
    }
}

struct FilterState {
    generation_id: Option<Uuid>,
    batch: BatchGate,
    /// Keyed by stem
    history: HashMap<String, StemHistory>,
}

pub struct WordFilter {
    params: FilterParams,
    random: Arc<dyn RandomSource>,
    state: Mutex<FilterState>,
}

impl WordFilter {
    pub fn new(params: FilterParams, random: Arc<dyn RandomSource>) -> Self {
        let batch = BatchGate::from_params(&params);
        Self {
            params,
            random,
            state: Mutex::new(FilterState {
                generation_id: None,
                batch,
                history: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FilterState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    pub fn current_generation(&self) -> Option<Uuid> {
        self.lock().generation_id
    }

    pub fn start_new_generation(&self) -> Uuid {
        self.start_new_generation_at(Instant::now())
    }

    /// Open a new batch and purge history past the horizon
    pub fn start_new_generation_at(&self, now: Instant) -> Uuid {
        let id = Uuid::new_v4();
        let horizon = Duration::from_secs(self.params.history_horizon_secs);

        let mut state = self.lock();
        state.batch.clear();
        state.generation_id = Some(id);
        let before = state.history.len();
        let live = |entry: &WordTrackingEntry| now.saturating_duration_since(entry.timestamp) < horizon;
        state.history.retain(|_, h| live(&h.latest));
        for h in state.history.values_mut() {
            if h.earlier.as_ref().is_some_and(|e| !live(e)) {
                h.earlier = None;
            }
        }

        info!(
            generation_id = %id,
            purged = before - state.history.len(),
            remembered = state.history.len(),
            "Started new generation"
        );
        id
    }

    pub fn should_reject(
        &self,
        name: &str,
        generation_id: Uuid,
        content_type: Option<ContentType>,
    ) -> bool {
        self.check_at(name, generation_id, content_type, Instant::now())
            .is_some()
    }

    pub fn should_reject_at(
        &self,
        name: &str,
        generation_id: Uuid,
        content_type: Option<ContentType>,
        now: Instant,
    ) -> bool {
        self.check_at(name, generation_id, content_type, now).is_some()
    }

    /// Full decision with reason; `None` means the name may be accepted
    pub fn check_at(
        &self,
        name: &str,
        generation_id: Uuid,
        content_type: Option<ContentType>,
        now: Instant,
    ) -> Option<FilterRejection> {
        let state = self.lock();

        if let Some(reason) = state.batch.check(name) {
            debug!(name, reason = %reason, "Rejected by batch gate");
            return Some(FilterRejection::Batch(reason));
        }

        // Youngest earlier-generation collision decides
        let youngest = state
            .batch
            .stems_of(name)
            .iter()
            .filter_map(|s| state.history.get(s))
            .filter_map(|h| h.outside(generation_id))
            .min_by_key(|entry| now.saturating_duration_since(entry.timestamp))
            .cloned();
        drop(state);

        let entry = youngest?;
        let age = now.saturating_duration_since(entry.timestamp);
        let p = &self.params;

        let rejection = if age < Duration::from_secs(p.very_recent_window_secs) {
            let cross_type = match (content_type, entry.content_type) {
                (Some(a), Some(b)) => a != b,
                _ => false,
            };
            let reject = !cross_type || self.random.chance(p.cross_type_reject_probability);
            reject.then(|| FilterRejection::VeryRecent {
                word: entry.word.clone(),
                cross_type,
            })
        } else if age < Duration::from_secs(p.recent_window_secs) {
            self.random
                .chance(p.recent_reject_probability)
                .then(|| FilterRejection::Recent {
                    word: entry.word.clone(),
                })
        } else if age < Duration::from_secs(p.history_horizon_secs) {
            self.random
                .chance(p.extended_reject_probability)
                .then(|| FilterRejection::Extended {
                    word: entry.word.clone(),
                })
        } else {
            None
        };

        if let Some(reason) = &rejection {
            debug!(name, age_secs = age.as_secs(), reason = %reason, "Rejected by history");
        }
        rejection
    }

    pub fn accept(&self, name: &str, generation_id: Uuid, content_type: Option<ContentType>) {
        self.accept_at(name, generation_id, content_type, Instant::now())
    }

    /// Record a name in the batch and in history
    pub fn accept_at(
        &self,
        name: &str,
        generation_id: Uuid,
        content_type: Option<ContentType>,
        now: Instant,
    ) {
        let mut state = self.lock();
        state.batch.admit(name);

        for word in significant_words(name, self.params.significant_min_len) {
            let stem = stem(&word);
            let entry = WordTrackingEntry {
                word,
                stem: stem.clone(),
                timestamp: now,
                generation_id,
                content_type,
            };
            match state.history.get_mut(&stem) {
                Some(h) => h.record(entry),
                None => {
                    state.history.insert(stem, StemHistory::new(entry));
                }
            }
        }

        let max = self.params.max_history_entries.max(1);
        if state.history.len() > max {
            let mut by_age: Vec<(String, Instant)> = state
                .history
                .iter()
                .map(|(k, h)| (k.clone(), h.latest.timestamp))
                .collect();
            by_age.sort_by_key(|(_, ts)| *ts);
            let excess = state.history.len() - max;
            for (key, _) in by_age.into_iter().take(excess) {
                state.history.remove(&key);
            }
        }

        debug!(name, generation_id = %generation_id, "Accepted name");
    }

    pub fn stats(&self) -> FilterStats {
        self.stats_at(Instant::now())
    }

    pub fn stats_at(&self, now: Instant) -> FilterStats {
        let state = self.lock();
        let oldest = state
            .history
            .values()
            .map(|h| now.saturating_duration_since(h.oldest()))
            .max()
            .unwrap_or_default();

        FilterStats {
            recent_words_count: state.history.len(),
            current_generation_words_count: state.batch.stem_count(),
            oldest_word_age_minutes: oldest.as_secs() / 60,
            generation_id: state.generation_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SeededRandom;

    /// Fixed draw for every roll
    struct Fixed(f64);

    impl RandomSource for Fixed {
        fn next_f64(&self) -> f64 {
            self.0
        }

        fn below(&self, _n: usize) -> usize {
            0
        }
    }

    fn filter_with(draw: f64) -> WordFilter {
        WordFilter::new(FilterParams::default(), Arc::new(Fixed(draw)))
    }

    const BAND: Option<ContentType> = Some(ContentType::Band);
    const SONG: Option<ContentType> = Some(ContentType::Song);

    #[test]
    fn test_batch_overlap_reset_by_new_generation() {
        let filter = WordFilter::new(FilterParams::default(), Arc::new(SeededRandom::from_seed(1)));
        let start = Instant::now();
        let generation = filter.start_new_generation_at(start);
        filter.accept_at("Velvet Thunder Parade", generation, BAND, start);

        assert!(filter.should_reject_at("Velvet Thunder", generation, BAND, start));
        // Same generation history never counts against itself
        assert!(!filter.should_reject_at("Velvet Lanterns", generation, BAND, start));

        // Hours later the batch and history are both clear
        let later = start + Duration::from_secs(2 * 3600);
        let next = filter.start_new_generation_at(later);
        assert!(!filter.should_reject_at("Velvet Thunder", next, BAND, later));
    }

    #[test]
    fn test_very_recent_same_type_always_rejects() {
        let filter = filter_with(0.99);
        let start = Instant::now();
        let first = filter.start_new_generation_at(start);
        filter.accept_at("Midnight Harbor", first, BAND, start);

        let now = start + Duration::from_secs(60);
        let second = filter.start_new_generation_at(now);
        assert!(matches!(
            filter.check_at("Harbor Lights", second, BAND, now),
            Some(FilterRejection::VeryRecent { cross_type: false, .. })
        ));
        // Cross type only rejects when the roll lands under 25%
        assert!(!filter.should_reject_at("Harbor Lights", second, SONG, now));
    }

    #[test]
    fn test_cross_type_low_roll_rejects() {
        let filter = filter_with(0.1);
        let start = Instant::now();
        let first = filter.start_new_generation_at(start);
        filter.accept_at("Midnight Harbor", first, BAND, start);

        let now = start + Duration::from_secs(30);
        let second = filter.start_new_generation_at(now);
        assert!(filter.should_reject_at("Harbor Lights", second, SONG, now));
    }

    #[test]
    fn test_fifteen_minutes_apart_uses_extended_rule() {
        let start = Instant::now();
        let now = start + Duration::from_secs(15 * 60);

        for (draw, expect_reject) in [(0.2, true), (0.5, false)] {
            let filter = filter_with(draw);
            let first = filter.start_new_generation_at(start);
            filter.accept_at("Glass Animals", first, BAND, start);
            let second = filter.start_new_generation_at(now);

            let decision = filter.check_at("Glass Animals", second, BAND, now);
            assert_eq!(decision.is_some(), expect_reject);
            assert!(!matches!(decision, Some(FilterRejection::VeryRecent { .. })));
        }
    }

    #[test]
    fn test_recent_window_half_probability() {
        let start = Instant::now();
        let now = start + Duration::from_secs(5 * 60);

        let reject = filter_with(0.4);
        let g = reject.start_new_generation_at(start);
        reject.accept_at("Silver Orchard", g, BAND, start);
        let g2 = reject.start_new_generation_at(now);
        assert!(matches!(
            reject.check_at("Orchard Bells", g2, BAND, now),
            Some(FilterRejection::Recent { .. })
        ));

        let pass = filter_with(0.6);
        let g = pass.start_new_generation_at(start);
        pass.accept_at("Silver Orchard", g, BAND, start);
        let g2 = pass.start_new_generation_at(now);
        assert!(!pass.should_reject_at("Orchard Bells", g2, BAND, now));
    }

    #[test]
    fn test_reuse_in_current_generation_keeps_earlier_timing() {
        let filter = filter_with(0.0);
        let start = Instant::now();
        let first = filter.start_new_generation_at(start);
        filter.accept_at("Midnight Harbor", first, BAND, start);

        let now = start + Duration::from_secs(30);
        let second = filter.start_new_generation_at(now);
        // "harbor" reused this generation must not hide the first use
        filter.accept_at("Harbor Lights", second, SONG, now);

        assert!(matches!(
            filter.check_at("Harbor Bells", second, BAND, now),
            Some(FilterRejection::VeryRecent { cross_type: false, .. })
        ));
    }

    #[test]
    fn test_history_bounded_by_count() {
        let params = FilterParams {
            max_history_entries: 3,
            ..FilterParams::default()
        };
        let filter = WordFilter::new(params, Arc::new(Fixed(0.0)));
        let start = Instant::now();
        let g = filter.start_new_generation_at(start);
        filter.accept_at("Amber Falcon", g, BAND, start);
        filter.accept_at("Copper Lantern", g, BAND, start + Duration::from_secs(1));

        let stats = filter.stats_at(start + Duration::from_secs(90));
        assert_eq!(stats.recent_words_count, 3);
        assert_eq!(stats.current_generation_words_count, 4);
        assert_eq!(stats.oldest_word_age_minutes, 1);
    }
}
