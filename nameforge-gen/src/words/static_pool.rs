//! Deterministic static names
//!
//! Used as filler when the repetition guard exhausts the attempt budget and
//! as the last-resort phrase when pattern instantiation keeps failing.

use super::inflect::{capitalize, pluralize, title_case};
use super::lexicon::{ADJECTIVES, NOUNS};
use crate::types::ContentType;
use std::collections::HashSet;

const STATIC_BAND_NAMES: &[&str] = &[
    "Glasswing",
    "Static Harbor",
    "Velvet Anchors",
    "Paper Comets",
    "The Hollow Parade",
    "Midnight Cartographers",
    "Copper Lanterns",
    "The Quiet Engines",
    "Saltwater Choir",
    "Northbound Ghosts",
    "The Amber Frontier",
    "Lowlight Society",
    "Tin Orchard",
    "Wild Meridian",
    "The Neon Pilgrims",
    "Cinder and Fern",
    "The Marble Arcade",
    "Distant Signal Union",
    "The Lantern Brigade of Dusk",
];

const STATIC_SONG_TITLES: &[&str] = &[
    "Undertow",
    "Porchlight",
    "Silver Hours",
    "Gravity Letters",
    "Drive Until Morning",
    "Ghosts in the Radio",
    "Slow Burn Summer",
    "Paper Boats",
    "Where the Rivers Bend",
    "Neon Lullaby",
    "Everything Is Static",
    "Hold the Last Light",
    "Coastline",
    "Fading Into Blue",
    "The Long Way Home Tonight",
];

/// Deterministic phrase of exactly `word_count` tokens
///
/// The same `(word_count, seed)` always yields the same phrase.
pub fn structured_phrase(word_count: usize, seed: usize) -> String {
    let adjective = |k: usize| ADJECTIVES[(seed.wrapping_mul(7).wrapping_add(k * 13)) % ADJECTIVES.len()];
    let noun = |k: usize| NOUNS[(seed.wrapping_mul(11).wrapping_add(k * 17)) % NOUNS.len()];

    let words: Vec<String> = match word_count {
        0 => Vec::new(),
        1 => vec![capitalize(noun(0))],
        2 => vec![adjective(0).to_string(), pluralize(noun(0))],
        n => {
            let mut words = vec!["the".to_string()];
            for k in 0..n - 2 {
                words.push(adjective(k).to_string());
            }
            words.push(pluralize(noun(0)));
            words
        }
    };

    title_case(&words.join(" "))
}

/// `n` distinct static names with exactly `word_count` tokens
///
/// Curated names come first (rotated by `offset`), then structured phrases.
pub fn static_names(content_type: ContentType, word_count: usize, n: usize, offset: usize) -> Vec<String> {
    let curated = match content_type {
        ContentType::Band => STATIC_BAND_NAMES,
        ContentType::Song => STATIC_SONG_TITLES,
    };

    let matching: Vec<&str> = curated
        .iter()
        .copied()
        .filter(|name| name.split_whitespace().count() == word_count)
        .collect();

    let mut seen = HashSet::new();
    let mut names = Vec::with_capacity(n);

    if !matching.is_empty() {
        for i in 0..matching.len() {
            if names.len() >= n {
                break;
            }
            let name = matching[(offset + i) % matching.len()].to_string();
            if seen.insert(name.to_lowercase()) {
                names.push(name);
            }
        }
    }

    let mut seed = offset;
    // Bounded: structured phrases cycle, so stop after a generous sweep
    let limit = offset + n * 50 + 100;
    while names.len() < n && seed < limit {
        let name = structured_phrase(word_count, seed);
        if seen.insert(name.to_lowercase()) {
            names.push(name);
        }
        seed += 1;
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_phrase_word_counts() {
        for n in 1..=10 {
            let phrase = structured_phrase(n, 3);
            assert_eq!(phrase.split_whitespace().count(), n, "'{}'", phrase);
        }
    }

    #[test]
    fn test_structured_phrase_is_deterministic() {
        assert_eq!(structured_phrase(4, 9), structured_phrase(4, 9));
        assert_ne!(structured_phrase(2, 1), structured_phrase(2, 2));
    }

    #[test]
    fn test_static_names_distinct_and_sized() {
        for word_count in 1..=6 {
            let names = static_names(ContentType::Band, word_count, 8, 0);
            assert_eq!(names.len(), 8);
            let unique: HashSet<_> = names.iter().map(|n| n.to_lowercase()).collect();
            assert_eq!(unique.len(), 8);
            assert!(names.iter().all(|n| n.split_whitespace().count() == word_count));
        }
    }

    #[test]
    fn test_curated_names_come_first() {
        let names = static_names(ContentType::Song, 1, 2, 0);
        assert_eq!(names[0], "Undertow");
    }
}
