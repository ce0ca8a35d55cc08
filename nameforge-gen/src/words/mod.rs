//! Word stores and per-request word pools
//!
//! `WordStores` holds the built-in vocabulary. `WordPools` layers
//! provider-harvested context words on top of it for one request and is the
//! only thing pattern slots draw from.

pub mod inflect;
pub mod lexicon;
pub mod static_pool;

use crate::error::PatternError;
use crate::random::{RandomExt, RandomSource};
use crate::types::{PartOfSpeech, VocabularyTerm};
use std::collections::HashSet;
use std::sync::Arc;

pub use static_pool::{static_names, structured_phrase};

/// Probability a slot prefers harvested context over built-in words
const DEFAULT_CONTEXT_BIAS: f64 = 0.4;

/// Word category a pattern slot asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Adjective,
    Noun,
    Plural,
    Verb,
    /// Third person singular verb
    Verbs,
    Gerund,
    Past,
    Music,
    Number,
    /// Any harvested context word (falls back to a noun)
    Context,
    /// Two short nouns fused into one token
    Compound,
}

impl Slot {
    pub fn parse(name: &str) -> Option<Slot> {
        match name.trim() {
            "adjective" | "adj" => Some(Slot::Adjective),
            "noun" => Some(Slot::Noun),
            "plural" | "nouns" => Some(Slot::Plural),
            "verb" => Some(Slot::Verb),
            "verbs" => Some(Slot::Verbs),
            "gerund" => Some(Slot::Gerund),
            "past" => Some(Slot::Past),
            "music" => Some(Slot::Music),
            "number" => Some(Slot::Number),
            "context" => Some(Slot::Context),
            "compound" => Some(Slot::Compound),
            _ => None,
        }
    }

    pub fn pool_name(&self) -> &'static str {
        match self {
            Slot::Adjective => "adjectives",
            Slot::Noun | Slot::Plural | Slot::Compound | Slot::Context => "nouns",
            Slot::Verb | Slot::Verbs | Slot::Gerund | Slot::Past => "verbs",
            Slot::Music => "music_terms",
            Slot::Number => "numbers",
        }
    }
}

/// Theme-specific words that take precedence for some draws
#[derive(Debug, Clone, Copy)]
pub struct SlotBias<'a> {
    pub adjectives: &'a [&'a str],
    pub nouns: &'a [&'a str],
    pub verbs: &'a [&'a str],
    /// Probability of drawing from the bias lists when they are non-empty
    pub weight: f64,
}

/// Built-in vocabulary
#[derive(Debug, Clone)]
pub struct WordStores {
    pub adjectives: Vec<String>,
    pub nouns: Vec<String>,
    pub verbs: Vec<String>,
    pub music_terms: Vec<String>,
    pub numbers: Vec<String>,
    famous_names: HashSet<String>,
}

impl WordStores {
    pub fn builtin() -> Self {
        fn owned(words: &[&str]) -> Vec<String> {
            words.iter().map(|w| w.to_string()).collect()
        }

        Self {
            adjectives: owned(lexicon::ADJECTIVES),
            nouns: owned(lexicon::NOUNS),
            verbs: owned(lexicon::VERBS),
            music_terms: owned(lexicon::MUSIC_TERMS),
            numbers: owned(lexicon::NUMBERS),
            famous_names: lexicon::FAMOUS_NAMES.iter().map(|n| n.to_string()).collect(),
        }
    }

    /// True when `name` matches a well-known artist or title
    pub fn is_famous(&self, name: &str) -> bool {
        let key = name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        self.famous_names.contains(&key)
    }
}

impl Default for WordStores {
    fn default() -> Self {
        Self::builtin()
    }
}

pub fn is_stop_word(word: &str) -> bool {
    lexicon::STOP_WORDS.contains(&word)
}

/// Keywords signalling alignment with a genre (empty when unknown)
pub fn genre_keywords(genre: &str) -> &'static [&'static str] {
    lexicon::GENRE_KEYWORDS
        .iter()
        .find(|(g, _)| *g == genre)
        .map(|(_, words)| *words)
        .unwrap_or(&[])
}

/// Keywords signalling alignment with a mood (empty when unknown)
pub fn mood_keywords(mood: &str) -> &'static [&'static str] {
    lexicon::MOOD_KEYWORDS
        .iter()
        .find(|(m, _)| *m == mood)
        .map(|(_, words)| *words)
        .unwrap_or(&[])
}

/// Suffix heuristic for words harvested without a part-of-speech tag
pub fn guess_part_of_speech(word: &str) -> PartOfSpeech {
    const ADJECTIVE_SUFFIXES: &[&str] = &[
        "ous", "ful", "ive", "less", "ical", "ic", "ish", "able", "ible", "ent", "ant", "ing",
        "ed", "y",
    ];
    const ADVERB_SUFFIXES: &[&str] = &["ly"];

    let lower = word.to_lowercase();
    if lower.len() > 4 && ADVERB_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
        return PartOfSpeech::Adverb;
    }
    if lower.len() > 3 && ADJECTIVE_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
        return PartOfSpeech::Adjective;
    }
    PartOfSpeech::Noun
}

fn usable_context_word(word: &str) -> bool {
    let len = word.chars().count();
    (3..=12).contains(&len)
        && word.chars().all(|c| c.is_ascii_alphabetic() || c == '-')
        && !is_stop_word(word)
}

/// Vocabulary available to pattern slots for one request
#[derive(Debug, Clone)]
pub struct WordPools {
    stores: Arc<WordStores>,
    context_adjectives: Vec<String>,
    context_nouns: Vec<String>,
    context_verbs: Vec<String>,
    context_any: Vec<String>,
    seen: HashSet<String>,
    context_bias: f64,
}

impl WordPools {
    pub fn new(stores: Arc<WordStores>) -> Self {
        Self {
            stores,
            context_adjectives: Vec::new(),
            context_nouns: Vec::new(),
            context_verbs: Vec::new(),
            context_any: Vec::new(),
            seen: HashSet::new(),
            context_bias: DEFAULT_CONTEXT_BIAS,
        }
    }

    pub fn with_context_bias(mut self, bias: f64) -> Self {
        self.context_bias = bias.clamp(0.0, 1.0);
        self
    }

    pub fn stores(&self) -> &WordStores {
        &self.stores
    }

    /// Add harvested terms. Phrases are split into words; stop words and
    /// tokens with digits or punctuation are skipped. A tagged part of speech
    /// only applies to single-word terms.
    /// Returns the number of new words absorbed.
    pub fn absorb_terms(&mut self, terms: &[VocabularyTerm]) -> usize {
        let mut added = 0;
        for term in terms {
            let words: Vec<String> = term
                .text
                .split_whitespace()
                .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
                .collect();
            let tagged = if words.len() == 1 { term.part_of_speech } else { None };

            for word in words {
                if !usable_context_word(&word) || !self.seen.insert(word.clone()) {
                    continue;
                }

                let pos = tagged.unwrap_or_else(|| guess_part_of_speech(&word));
                match pos {
                    PartOfSpeech::Adjective => self.context_adjectives.push(word.clone()),
                    PartOfSpeech::Noun => self.context_nouns.push(word.clone()),
                    PartOfSpeech::Verb => self.context_verbs.push(word.clone()),
                    PartOfSpeech::Adverb => {}
                }
                self.context_any.push(word);
                added += 1;
            }
        }
        added
    }

    pub fn context_len(&self) -> usize {
        self.context_any.len()
    }

    pub fn has_context(&self) -> bool {
        !self.context_any.is_empty()
    }

    /// Context words that are long enough to read as keywords
    pub fn keywords(&self) -> Vec<String> {
        self.context_any.iter().filter(|w| w.len() >= 4).cloned().collect()
    }

    fn choose(
        &self,
        bias: &[&str],
        bias_weight: f64,
        context: &[String],
        base: &[String],
        pool: &'static str,
        rng: &dyn RandomSource,
    ) -> Result<String, PatternError> {
        if !bias.is_empty() && rng.chance(bias_weight) {
            if let Some(word) = rng.pick(bias) {
                return Ok(word.to_string());
            }
        }
        if !context.is_empty() && rng.chance(self.context_bias) {
            if let Some(word) = rng.pick(context) {
                return Ok(word.clone());
            }
        }
        rng.pick(base)
            .or_else(|| rng.pick(context))
            .cloned()
            .ok_or(PatternError::EmptyPool(pool))
    }

    fn base_word(
        &self,
        slot: Slot,
        bias: Option<&SlotBias<'_>>,
        rng: &dyn RandomSource,
    ) -> Result<String, PatternError> {
        let weight = bias.map(|b| b.weight).unwrap_or(0.0);
        let empty: &[&str] = &[];
        let stores = &self.stores;

        match slot {
            Slot::Adjective => self.choose(
                bias.map(|b| b.adjectives).unwrap_or(empty),
                weight,
                &self.context_adjectives,
                &stores.adjectives,
                "adjectives",
                rng,
            ),
            Slot::Noun | Slot::Plural | Slot::Compound => self.choose(
                bias.map(|b| b.nouns).unwrap_or(empty),
                weight,
                &self.context_nouns,
                &stores.nouns,
                "nouns",
                rng,
            ),
            Slot::Verb | Slot::Verbs | Slot::Gerund | Slot::Past => self.choose(
                bias.map(|b| b.verbs).unwrap_or(empty),
                weight,
                &self.context_verbs,
                &stores.verbs,
                "verbs",
                rng,
            ),
            Slot::Music => self.choose(empty, 0.0, &[], &stores.music_terms, "music_terms", rng),
            Slot::Number => self.choose(empty, 0.0, &[], &stores.numbers, "numbers", rng),
            Slot::Context => {
                if let Some(word) = rng.pick(&self.context_any) {
                    Ok(word.clone())
                } else {
                    self.choose(
                        bias.map(|b| b.nouns).unwrap_or(empty),
                        weight,
                        &[],
                        &stores.nouns,
                        "nouns",
                        rng,
                    )
                }
            }
        }
    }

    /// Draw a rendered (inflected, lowercase) word for a slot
    pub fn draw(
        &self,
        slot: Slot,
        bias: Option<&SlotBias<'_>>,
        rng: &dyn RandomSource,
    ) -> Result<String, PatternError> {
        let word = self.base_word(slot, bias, rng)?;
        Ok(match slot {
            Slot::Plural => inflect::pluralize(&word),
            Slot::Gerund => inflect::gerund(&word),
            Slot::Past => inflect::past_tense(&word),
            Slot::Verbs => inflect::third_person(&word),
            Slot::Compound => {
                let second = self.base_word(Slot::Noun, bias, rng)?;
                compound(&word, &second)
            }
            _ => word,
        })
    }
}

/// Fuse two nouns into one token ("fire" + "hawk" -> "firehawk")
fn compound(first: &str, second: &str) -> String {
    if first == second {
        return first.to_string();
    }
    let head: String = first.chars().take(6).collect();
    let tail: String = second.chars().take(7).collect();
    format!("{}{}", head, tail).replace('-', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SeededRandom;

    fn pools() -> WordPools {
        WordPools::new(Arc::new(WordStores::builtin()))
    }

    #[test]
    fn test_draw_every_slot_from_builtin() {
        let pools = pools();
        let rng = SeededRandom::from_seed(11);
        for name in [
            "adjective", "noun", "plural", "verb", "verbs", "gerund", "past", "music", "number",
            "context", "compound",
        ] {
            let slot = Slot::parse(name).unwrap();
            let word = pools.draw(slot, None, &rng).unwrap();
            assert!(!word.is_empty());
            assert_eq!(word.split_whitespace().count(), 1, "slot {} produced '{}'", name, word);
        }
    }

    #[test]
    fn test_absorb_terms_splits_phrases() {
        let mut pools = pools();
        let added = pools.absorb_terms(&[VocabularyTerm::new("Aphex Twin").with_pos(PartOfSpeech::Verb)]);
        assert_eq!(added, 2);
        assert!(pools.context_verbs.is_empty());
        assert_eq!(pools.context_nouns, vec!["aphex", "twin"]);
    }

    #[test]
    fn test_absorb_terms_filters_and_classifies() {
        let mut pools = pools();
        let added = pools.absorb_terms(&[
            VocabularyTerm::new("Thunderous"),
            VocabularyTerm::new("the"),
            VocabularyTerm::new("of the"),
            VocabularyTerm::new("glacier").with_pos(PartOfSpeech::Noun),
            VocabularyTerm::new("glacier"),
            VocabularyTerm::new("smolder").with_pos(PartOfSpeech::Verb),
        ]);

        assert_eq!(added, 3);
        assert_eq!(pools.context_adjectives, vec!["thunderous"]);
        assert_eq!(pools.context_nouns, vec!["glacier"]);
        assert_eq!(pools.context_verbs, vec!["smolder"]);
        assert!(pools.has_context());
    }

    #[test]
    fn test_context_slot_prefers_harvested_words() {
        let mut pools = pools();
        pools.absorb_terms(&[VocabularyTerm::new("zephyr").with_pos(PartOfSpeech::Noun)]);
        let rng = SeededRandom::from_seed(2);
        assert_eq!(pools.draw(Slot::Context, None, &rng).unwrap(), "zephyr");
    }

    #[test]
    fn test_full_bias_weight_always_uses_bias_lists() {
        let pools = pools();
        let rng = SeededRandom::from_seed(4);
        let bias = SlotBias {
            adjectives: &["nebular"],
            nouns: &["quasar"],
            verbs: &["orbit"],
            weight: 1.0,
        };
        assert_eq!(pools.draw(Slot::Adjective, Some(&bias), &rng).unwrap(), "nebular");
        assert_eq!(pools.draw(Slot::Plural, Some(&bias), &rng).unwrap(), "quasars");
        assert_eq!(pools.draw(Slot::Gerund, Some(&bias), &rng).unwrap(), "orbiting");
    }

    #[test]
    fn test_famous_names_detected_case_insensitively() {
        let stores = WordStores::builtin();
        assert!(stores.is_famous("The  Rolling Stones"));
        assert!(!stores.is_famous("The Rolling Glaciers"));
    }

    #[test]
    fn test_guess_part_of_speech() {
        assert_eq!(guess_part_of_speech("dangerous"), PartOfSpeech::Adjective);
        assert_eq!(guess_part_of_speech("slowly"), PartOfSpeech::Adverb);
        assert_eq!(guess_part_of_speech("harbor"), PartOfSpeech::Noun);
    }
}
