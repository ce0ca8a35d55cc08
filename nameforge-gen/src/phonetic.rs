//! Phonetic flow analysis
//!
//! Heuristic scoring of how a name sounds. Four sub-scores in [0, 100]:
//!
//! | Score         | Looks at                                                   |
//! |---------------|------------------------------------------------------------|
//! | pronunciation | hard clusters, long consonant/vowel runs, very long words  |
//! | flow          | sounds at word boundaries, syllable rhythm, alliteration   |
//! | memorability  | length, word count, rhyme, doubled letters, mixed case     |
//! | uniqueness    | uncommon openings, unusual letter pairs, digits, compounds |
//!
//! `overall = 0.30 pronunciation + 0.25 flow + 0.25 memorability + 0.20 uniqueness`
//!
//! Scoring works on the lowercase, whitespace-collapsed form. The only case
//! information kept is whether some word switches case mid-word ("DeadMau5"),
//! and that flag is part of the cache key.

use crate::cache::{CacheStats, MaintenanceTask, TtlCache};
use crate::params::PhoneticParams;
use crate::words::is_stop_word;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

const DIFFICULT_CLUSTERS: &[&str] = &[
    "bk", "cj", "cv", "dx", "fq", "fx", "gq", "gx", "hx", "jx", "kq", "kx", "mx", "pq", "pz",
    "qz", "sx", "tq", "vb", "vf", "vj", "vk", "vm", "vp", "vw", "vx", "wq", "wx", "xj", "zj",
    "zq",
];

const AWKWARD_DOUBLES: &[&str] = &["aa", "ii", "uu", "hh", "jj", "kk", "qq", "vv", "ww", "xx", "yy"];

const UNUSUAL_PAIRS: &[&str] = &["zz", "xy", "yx", "kh", "zh", "vy", "ae", "oe", "ij", "yl", "ky"];

const UNCOMMON_STARTS: &[char] = &['q', 'x', 'z', 'j', 'v', 'k', 'y'];

const DOUBLED_LETTER_BONUS: f64 = 4.0;
const DOUBLED_LETTER_CAP: f64 = 8.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneticScore {
    pub overall: f64,
    pub pronunciation: f64,
    pub flow: f64,
    pub memorability: f64,
    pub uniqueness: f64,
    pub issues: Vec<String>,
}

impl PhoneticScore {
    fn empty() -> Self {
        Self {
            overall: 0.0,
            pronunciation: 0.0,
            flow: 0.0,
            memorability: 0.0,
            uniqueness: 0.0,
            issues: vec!["empty name".to_string()],
        }
    }
}

/// Cache key and scoring input: lowercase, single-spaced
pub fn normalize_for_scoring(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// True when a word has an uppercase letter after a lowercase one
///
/// Title case and all caps are not mixed.
pub fn has_mixed_case(name: &str) -> bool {
    name.split_whitespace().any(|word| {
        let mut seen_lower = false;
        word.chars().any(|c| {
            if c.is_lowercase() {
                seen_lower = true;
            }
            seen_lower && c.is_uppercase()
        })
    })
}

fn has_digit_or_symbol(name: &str) -> bool {
    name.chars()
        .any(|c| c.is_ascii_digit() || !(c.is_alphanumeric() || c.is_whitespace() || c == '\''))
}

/// Adjacent identical letters inside words ("bootts" has two)
fn doubled_letters(words: &[&str]) -> usize {
    words
        .iter()
        .map(|w| letters(w).windows(2).filter(|p| p[0] == p[1]).count())
        .sum()
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

fn letters(word: &str) -> Vec<char> {
    word.chars().filter(|c| c.is_alphabetic()).collect()
}

/// Vowel groups, with a silent trailing 'e' dropped; at least one
pub fn count_syllables(word: &str) -> usize {
    let chars = letters(word);
    let mut count = 0;
    let mut prev_vowel = false;
    for &c in &chars {
        let vowel = is_vowel(c);
        if vowel && !prev_vowel {
            count += 1;
        }
        prev_vowel = vowel;
    }
    let n = chars.len();
    if count > 1 && n > 2 && chars[n - 1] == 'e' && !is_vowel(chars[n - 2]) && chars[n - 2] != 'l' {
        count -= 1;
    }
    count.max(1)
}

fn longest_runs(word: &str) -> (usize, usize) {
    let mut consonant = (0, 0);
    let mut vowel = (0, 0);
    for c in letters(word) {
        if is_vowel(c) {
            vowel.0 += 1;
            consonant.0 = 0;
        } else {
            consonant.0 += 1;
            vowel.0 = 0;
        }
        consonant.1 = consonant.1.max(consonant.0);
        vowel.1 = vowel.1.max(vowel.0);
    }
    (consonant.1, vowel.1)
}

fn pronunciation(words: &[&str], issues: &mut Vec<String>) -> f64 {
    let mut score = 100.0;
    for word in words {
        for cluster in DIFFICULT_CLUSTERS {
            if word.contains(*cluster) {
                score -= 10.0;
                issues.push(format!("difficult cluster '{}' in '{}'", cluster, word));
            }
        }
        for double in AWKWARD_DOUBLES {
            if word.contains(*double) {
                score -= 5.0;
                issues.push(format!("awkward pair '{}' in '{}'", double, word));
            }
        }

        let (consonants, vowels) = longest_runs(word);
        if consonants >= 4 {
            score -= 15.0;
            issues.push(format!("{} consonants in a row in '{}'", consonants, word));
        }
        if vowels >= 4 {
            score -= 10.0;
            issues.push(format!("{} vowels in a row in '{}'", vowels, word));
        }
        if word.chars().count() > 12 {
            score -= 10.0;
            issues.push(format!("'{}' is very long", word));
        }
    }
    score
}

fn flow(words: &[&str], issues: &mut Vec<String>) -> f64 {
    let mut score: f64 = 70.0;

    for pair in words.windows(2) {
        let (Some(end), Some(start)) = (pair[0].chars().last(), pair[1].chars().next()) else {
            continue;
        };
        match (is_vowel(end), is_vowel(start)) {
            (false, false) if end == start => {
                score -= 8.0;
                issues.push(format!("'{}' runs into '{}'", pair[0], pair[1]));
            }
            (false, true) => score += 5.0,
            (true, true) => score -= 3.0,
            _ => {}
        }
    }

    let syllables: Vec<usize> = words.iter().map(|w| count_syllables(w)).collect();
    let total: usize = syllables.iter().sum();
    if (3..=8).contains(&total) {
        score += 10.0;
    } else if total > 12 {
        score -= 10.0;
    }
    if words.len() > 1 && syllables.windows(2).all(|w| w[0] == w[1]) {
        score += 5.0;
    }
    if syllables.iter().any(|s| *s > 4) {
        score -= 5.0;
    }

    match alliteration_run(words) {
        0 | 1 => {}
        2 => score += 8.0,
        n => {
            score -= 10.0;
            issues.push(format!("alliteration across {} words", n));
        }
    }

    score
}

/// Most content words sharing a first letter
fn alliteration_run(words: &[&str]) -> usize {
    let initials: Vec<char> = words
        .iter()
        .filter(|w| !is_stop_word(w))
        .filter_map(|w| w.chars().next())
        .filter(|c| c.is_alphabetic())
        .collect();
    initials
        .iter()
        .map(|c| initials.iter().filter(|o| *o == c).count())
        .max()
        .unwrap_or(0)
}

fn rhymes(a: &str, b: &str) -> bool {
    let a = letters(a);
    let b = letters(b);
    a.len() >= 3 && b.len() >= 3 && a != b && a[a.len() - 2..] == b[b.len() - 2..]
}

fn primary_vowel(word: &str) -> Option<char> {
    letters(word).into_iter().find(|c| is_vowel(*c))
}

fn memorability(name: &str, words: &[&str], mixed_case: bool) -> f64 {
    let mut score = 50.0;
    let len = name.chars().count();
    if (8..=20).contains(&len) {
        score += 20.0;
    } else if !(4..=30).contains(&len) {
        score -= 15.0;
    }

    match words.len() {
        2 | 3 => score += 15.0,
        1 => score += 5.0,
        n if n > 5 => score -= 10.0,
        _ => {}
    }

    let content: Vec<&str> = words.iter().copied().filter(|w| !is_stop_word(w)).collect();
    let mut rhyme = false;
    let mut assonance = false;
    for (i, a) in content.iter().enumerate() {
        for b in content.iter().skip(i + 1) {
            rhyme |= rhymes(a, b);
            assonance |= primary_vowel(a).is_some() && primary_vowel(a) == primary_vowel(b);
        }
    }
    if rhyme {
        score += 10.0;
    }
    if assonance {
        score += 5.0;
    }

    if alliteration_run(words) == 2 {
        score += 5.0;
    }

    // Distinctive spellings
    score += (doubled_letters(words) as f64 * DOUBLED_LETTER_BONUS).min(DOUBLED_LETTER_CAP);
    if mixed_case {
        score += 8.0;
    }
    if has_digit_or_symbol(name) {
        score += 8.0;
    }
    score
}

fn uniqueness(name: &str, words: &[&str], mixed_case: bool) -> f64 {
    let mut score = 50.0;

    if let Some(first) = name.chars().next() {
        if UNCOMMON_STARTS.contains(&first) {
            score += 15.0;
        }
    }
    if name.starts_with("the ") {
        score -= 5.0;
    }

    let unusual = UNUSUAL_PAIRS.iter().filter(|p| name.contains(**p)).count();
    score += (unusual as f64 * 5.0).min(20.0);

    if has_digit_or_symbol(name) {
        score += 10.0;
    }
    if mixed_case {
        score += 10.0;
    }

    if words.iter().any(|w| w.chars().count() >= 9) {
        score += 10.0;
    }

    let common = words.iter().filter(|w| is_stop_word(w)).count();
    score -= common as f64 * 5.0;
    score
}

/// Score a name; pure and deterministic
pub fn analyze(name: &str) -> PhoneticScore {
    let normalized = normalize_for_scoring(name);
    let mixed_case = has_mixed_case(name);
    if normalized.is_empty() {
        return PhoneticScore::empty();
    }

    let words: Vec<&str> = normalized.split(' ').collect();
    let mut issues = Vec::new();

    let pronunciation = pronunciation(&words, &mut issues).clamp(0.0, 100.0);
    let flow = flow(&words, &mut issues).clamp(0.0, 100.0);
    let memorability = memorability(&normalized, &words, mixed_case).clamp(0.0, 100.0);
    let uniqueness = uniqueness(&normalized, &words, mixed_case).clamp(0.0, 100.0);
    let overall = (0.30 * pronunciation + 0.25 * flow + 0.25 * memorability + 0.20 * uniqueness)
        .clamp(0.0, 100.0);

    PhoneticScore {
        overall,
        pronunciation,
        flow,
        memorability,
        uniqueness,
        issues,
    }
}

/// Caching front for `analyze`
pub struct PhoneticAnalyzer {
    /// Keyed by normalized name plus the mixed-case flag
    cache: Arc<TtlCache<(String, bool), PhoneticScore>>,
    sweeper: Mutex<Option<MaintenanceTask>>,
}

impl PhoneticAnalyzer {
    pub fn new(params: &PhoneticParams) -> Self {
        let cache = Arc::new(TtlCache::new(
            params.cache_capacity,
            Duration::from_secs(params.cache_ttl_secs),
        ));

        let target = Arc::clone(&cache);
        let sweeper = MaintenanceTask::spawn(
            "phonetic-cache-sweep",
            Duration::from_secs(params.sweep_interval_secs),
            move || {
                let removed = target.sweep();
                if removed > 0 {
                    debug!(removed, "Swept expired phonetic scores");
                }
            },
        );

        Self {
            cache,
            sweeper: Mutex::new(sweeper),
        }
    }

    pub fn score(&self, name: &str) -> PhoneticScore {
        let key = (normalize_for_scoring(name), has_mixed_case(name));
        if let Some(hit) = self.cache.get(&key) {
            return hit;
        }
        let score = analyze(name);
        self.cache.insert(key, score.clone());
        score
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub async fn shutdown(&self) {
        let task = self.sweeper.lock().unwrap_or_else(|p| p.into_inner()).take();
        if let Some(task) = task {
            task.shutdown().await;
        }
    }
}

impl Default for PhoneticAnalyzer {
    fn default() -> Self {
        Self::new(&PhoneticParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "Velvet Thunder",
        "The Midnight Orchard Of Broken Silver Lanterns",
        "Xqzt Brrkvst",
        "Aaaiieee",
        "Sunset",
        "Blink 182",
        "Silent Silver Sea Serpents",
        "a",
    ];

    #[test]
    fn test_scores_bounded() {
        for name in SAMPLES {
            let score = analyze(name);
            for value in [
                score.overall,
                score.pronunciation,
                score.flow,
                score.memorability,
                score.uniqueness,
            ] {
                assert!((0.0..=100.0).contains(&value), "{} -> {:?}", name, score);
            }
        }
    }

    #[test]
    fn test_overall_weighting() {
        let s = analyze("Velvet Thunder");
        let expected =
            0.30 * s.pronunciation + 0.25 * s.flow + 0.25 * s.memorability + 0.20 * s.uniqueness;
        assert!((s.overall - expected).abs() < 1e-9);
    }

    #[test]
    fn test_normalization_stable() {
        assert_eq!(analyze("  Velvet   THUNDER "), analyze("velvet thunder"));
    }

    #[test]
    fn test_hard_names_score_lower() {
        let hard = analyze("Xqzt Brrkvst");
        let easy = analyze("Silver Lake");
        assert!(hard.pronunciation < easy.pronunciation);
        assert!(hard.overall < easy.overall);
        assert!(!hard.issues.is_empty());
    }

    #[test]
    fn test_heavy_alliteration_flagged() {
        let score = analyze("Silent Silver Sea Serpents");
        assert!(score.issues.iter().any(|i| i.contains("alliteration")));
    }

    #[test]
    fn test_empty_name() {
        let score = analyze("   ");
        assert_eq!(score.overall, 0.0);
        assert_eq!(score.issues, vec!["empty name"]);
    }

    #[test]
    fn test_syllables() {
        assert_eq!(count_syllables("thunder"), 2);
        assert_eq!(count_syllables("stone"), 1);
        assert_eq!(count_syllables("candle"), 2);
        assert_eq!(count_syllables("a"), 1);
    }

    #[test]
    fn test_digits_and_mixed_case_are_memorable() {
        let plain = analyze("deadmaus");
        let styled = analyze("DeadMau5");
        assert!(styled.memorability > plain.memorability);
        assert!(styled.uniqueness > plain.uniqueness);
    }

    #[test]
    fn test_doubled_letters_are_memorable() {
        assert!(analyze("Bootts").memorability > analyze("Boots").memorability);
    }

    #[test]
    fn test_mixed_case_detection() {
        assert!(has_mixed_case("DeadMau5"));
        assert!(has_mixed_case("the McCoys"));
        assert!(!has_mixed_case("Velvet Thunder"));
        assert!(!has_mixed_case("VELVET thunder"));
    }

    #[test]
    fn test_analyzer_keeps_mixed_case_apart() {
        let analyzer = PhoneticAnalyzer::default();
        let styled = analyzer.score("DeadMau5");
        let plain = analyzer.score("deadmau5");
        assert_ne!(styled, plain);
        assert_eq!(analyzer.cache_len(), 2);
    }

    #[test]
    fn test_analyzer_caches_by_normalized_name() {
        let analyzer = PhoneticAnalyzer::default();
        let first = analyzer.score("Velvet Thunder");
        let second = analyzer.score("VELVET  thunder");
        assert_eq!(first, second);
        assert_eq!(analyzer.cache_len(), 1);
        assert_eq!(analyzer.cache_stats().hits, 1);
    }
}
