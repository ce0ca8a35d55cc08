//! Genre compatibility matrix
//!
//! Each canonical genre is described by a coarse musical profile
//! (danceability, aggression, acoustic, electronic, happy, relaxed, dark).
//! Pairwise compatibility is one minus the mean absolute profile distance,
//! plus a bonus for genres in the same family. All pairs are computed once
//! at construction; lookups are read-only.

use crate::genres::{canonicalize, CANONICAL_GENRES};
use std::collections::HashMap;

/// Score returned when either genre is unknown
pub const NEUTRAL_SCORE: f64 = 0.5;
/// Minimum score for two genres to count as compatible
pub const COMPATIBLE_THRESHOLD: f64 = 0.6;
const FAMILY_BONUS: f64 = 0.15;

// [danceability, aggression, acoustic, electronic, happy, relaxed, dark]
type Profile = [f64; 7];

const PROFILES: &[(&str, Profile)] = &[
    ("rock", [0.5, 0.7, 0.4, 0.2, 0.5, 0.3, 0.5]),
    ("metal", [0.3, 0.95, 0.1, 0.3, 0.2, 0.1, 0.9]),
    ("punk", [0.6, 0.9, 0.3, 0.1, 0.5, 0.1, 0.6]),
    ("indie", [0.5, 0.4, 0.6, 0.4, 0.5, 0.5, 0.4]),
    ("pop", [0.8, 0.3, 0.4, 0.6, 0.8, 0.4, 0.2]),
    ("electronic", [0.85, 0.4, 0.05, 0.95, 0.6, 0.4, 0.4]),
    ("hip-hop", [0.8, 0.6, 0.2, 0.7, 0.5, 0.3, 0.5]),
    ("rnb", [0.75, 0.2, 0.4, 0.5, 0.6, 0.6, 0.3]),
    ("jazz", [0.5, 0.2, 0.85, 0.1, 0.6, 0.7, 0.3]),
    ("blues", [0.4, 0.3, 0.8, 0.1, 0.3, 0.5, 0.6]),
    ("folk", [0.3, 0.1, 0.95, 0.05, 0.5, 0.8, 0.3]),
    ("country", [0.5, 0.2, 0.85, 0.1, 0.7, 0.6, 0.2]),
    ("classical", [0.1, 0.1, 0.95, 0.05, 0.5, 0.8, 0.4]),
    ("ambient", [0.1, 0.05, 0.4, 0.8, 0.4, 0.95, 0.5]),
    ("soul", [0.6, 0.2, 0.7, 0.2, 0.6, 0.6, 0.3]),
    ("funk", [0.9, 0.3, 0.6, 0.3, 0.85, 0.4, 0.2]),
    ("reggae", [0.7, 0.2, 0.7, 0.2, 0.8, 0.8, 0.2]),
    ("latin", [0.85, 0.2, 0.7, 0.3, 0.85, 0.4, 0.2]),
];

const FAMILIES: &[&[&str]] = &[
    &["rock", "metal", "punk"],
    &["rock", "indie"],
    &["pop", "electronic", "hip-hop", "rnb", "funk"],
    &["folk", "country", "blues"],
    &["jazz", "blues", "soul", "funk", "rnb"],
    &["classical", "ambient"],
    &["reggae", "latin"],
];

fn same_family(a: &str, b: &str) -> bool {
    FAMILIES
        .iter()
        .any(|family| family.contains(&a) && family.contains(&b))
}

fn pair_key(a: &'static str, b: &'static str) -> (&'static str, &'static str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

pub struct GenreMatrix {
    scores: HashMap<(&'static str, &'static str), f64>,
}

impl Default for GenreMatrix {
    fn default() -> Self {
        Self::new()
    }
}

impl GenreMatrix {
    pub fn new() -> Self {
        let mut scores = HashMap::new();
        for (i, (a, pa)) in PROFILES.iter().enumerate() {
            for (b, pb) in PROFILES.iter().skip(i) {
                let score = if a == b {
                    1.0
                } else {
                    let distance: f64 =
                        pa.iter().zip(pb.iter()).map(|(x, y)| (x - y).abs()).sum::<f64>()
                            / pa.len() as f64;
                    let bonus = if same_family(a, b) { FAMILY_BONUS } else { 0.0 };
                    (1.0 - distance + bonus).clamp(0.0, 1.0)
                };
                scores.insert(pair_key(*a, *b), score);
            }
        }
        debug_assert_eq!(PROFILES.len(), CANONICAL_GENRES.len());
        Self { scores }
    }

    /// Compatibility in [0, 1]; unknown genres score neutral
    pub fn score(&self, a: &str, b: &str) -> f64 {
        match (canonicalize(a), canonicalize(b)) {
            (Some(a), Some(b)) => self
                .scores
                .get(&pair_key(a, b))
                .copied()
                .unwrap_or(NEUTRAL_SCORE),
            _ => NEUTRAL_SCORE,
        }
    }

    /// Best score of `genre` against any of `candidates`; neutral when empty
    pub fn best_match(&self, genre: &str, candidates: &[&str]) -> f64 {
        candidates
            .iter()
            .map(|c| self.score(genre, c))
            .fold(None, |best: Option<f64>, s| Some(best.map_or(s, |b| b.max(s))))
            .unwrap_or(NEUTRAL_SCORE)
    }

    pub fn is_compatible(&self, a: &str, b: &str) -> bool {
        self.score(a, b) >= COMPATIBLE_THRESHOLD
    }

    /// Other canonical genres at or above `min_score`, best first
    pub fn related(&self, genre: &str, min_score: f64) -> Vec<(&'static str, f64)> {
        let Some(genre) = canonicalize(genre) else {
            return Vec::new();
        };

        let mut related: Vec<(&'static str, f64)> = CANONICAL_GENRES
            .iter()
            .filter(|other| **other != genre)
            .filter_map(|other| {
                let score = self.scores.get(&pair_key(genre, *other)).copied()?;
                (score >= min_score).then_some((*other, score))
            })
            .collect();
        related.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(b.0))
        });
        related
    }
}
