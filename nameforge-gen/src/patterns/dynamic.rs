//! Dynamic structures
//!
//! Builds a slot template for any word count from 1 to 10. Short counts use
//! a handful of hand-picked shapes; longer ones join two noun phrases with a
//! connector and spread the remaining words across adjective slots.

use super::{Segment, Template};
use crate::random::{RandomExt, RandomSource};
use crate::words::Slot;

/// (connector, words it takes)
const CONNECTORS: &[(&str, usize)] = &[("of the", 2), ("in the", 2), ("and", 1), ("of", 1), ("beyond the", 2)];

fn lit(text: &str) -> Segment {
    Segment::Literal(text.to_string())
}

fn word(slot: Slot) -> Segment {
    Segment::Word(slot)
}

fn short_shape(word_count: usize, rng: &dyn RandomSource) -> Vec<Segment> {
    use Slot::*;
    let shapes: Vec<Vec<Segment>> = match word_count {
        1 => vec![vec![word(Noun)], vec![word(Compound)], vec![word(Gerund)], vec![word(Plural)]],
        2 => vec![
            vec![word(Adjective), word(Plural)],
            vec![word(Adjective), word(Noun)],
            vec![word(Noun), word(Plural)],
            vec![word(Gerund), word(Noun)],
            vec![lit("the"), word(Plural)],
        ],
        3 => vec![
            vec![lit("the"), word(Adjective), word(Plural)],
            vec![word(Adjective), word(Noun), word(Plural)],
            vec![word(Noun), lit("of"), word(Plural)],
            vec![word(Gerund), word(Adjective), word(Plural)],
            vec![word(Noun), word(Verbs), word(Adjective)],
        ],
        _ => vec![
            vec![lit("the"), word(Adjective), word(Adjective), word(Plural)],
            vec![word(Noun), lit("in the"), word(Noun)],
            vec![word(Gerund), lit("the"), word(Adjective), word(Noun)],
            vec![word(Adjective), word(Noun), lit("of"), word(Plural)],
            vec![word(Plural), word(Past), lit("by"), word(Plural)],
        ],
    };
    let index = rng.below(shapes.len());
    shapes.into_iter().nth(index).unwrap_or_default()
}

/// Noun phrase of `len` words: adjectives then a head noun
fn noun_phrase(len: usize, head: Slot, rng: &dyn RandomSource) -> Vec<Segment> {
    let mut segments = Vec::with_capacity(len);
    for i in 0..len.saturating_sub(1) {
        // Occasionally lead with a gerund for variety
        if i == 0 && rng.chance(0.2) {
            segments.push(word(Slot::Gerund));
        } else {
            segments.push(word(Slot::Adjective));
        }
    }
    segments.push(word(head));
    segments
}

/// Template with exactly `word_count` words (clamped to 1..=10)
pub fn structure(word_count: usize, rng: &dyn RandomSource) -> Template {
    let n = word_count.clamp(1, 10);
    if n <= 4 {
        return Template::from_segments(short_shape(n, rng));
    }

    let (connector, connector_len) = CONNECTORS[rng.below(CONNECTORS.len())];
    let phrase_words = n - connector_len;
    // Front phrase gets the smaller half
    let left = phrase_words / 2;
    let right = phrase_words - left;

    let mut segments = Vec::with_capacity(n);
    if left >= 3 && rng.chance(0.5) {
        segments.push(lit("the"));
        segments.extend(noun_phrase(left - 1, Slot::Noun, rng));
    } else {
        segments.extend(noun_phrase(left, Slot::Noun, rng));
    }
    segments.push(lit(connector));
    segments.extend(noun_phrase(right, Slot::Plural, rng));

    Template::from_segments(segments)
}
