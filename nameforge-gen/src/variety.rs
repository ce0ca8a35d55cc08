//! Variety optimizer
//!
//! Final pass over a candidate batch: dedupe, score, re-run the batch gate,
//! cap each source's share and cut (or pad) to the requested count.

use crate::error::GenerationError;
use crate::filter::BatchGate;
use crate::params::FilterParams;
use crate::phonetic::PhoneticAnalyzer;
use crate::types::{CandidateSource, GenerationRequest, GenerationResult, WordCount};
use crate::words::static_pool::static_names;
use crate::words::{genre_keywords, is_stop_word, mood_keywords};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

const BASE_SCORE: f64 = 50.0;
const KEYWORD_BONUS: f64 = 5.0;
const GENRE_BONUS_CAP: f64 = 15.0;
const MOOD_BONUS_CAP: f64 = 10.0;
const UNIQUE_SHAPE_BONUS: f64 = 6.0;
const ALLITERATION_BONUS: f64 = 4.0;
/// Static names drawn per missing slot, leaving room for gate refusals
const PAD_POOL_FACTOR: usize = 4;

fn source_bonus(source: CandidateSource) -> f64 {
    match source {
        CandidateSource::Ai => 20.0,
        CandidateSource::FusedPattern => 12.0,
        CandidateSource::DynamicPattern => 10.0,
        CandidateSource::Pattern => 8.0,
        CandidateSource::StaticFallback => 3.0,
        CandidateSource::StaticPool => 0.0,
    }
}

fn length_bonus(name: &str) -> f64 {
    match name.chars().count() {
        8..=20 => 10.0,
        5..=7 | 21..=30 => 5.0,
        _ => -5.0,
    }
}

fn lower_words(name: &str) -> Vec<String> {
    name.split_whitespace().map(str::to_lowercase).collect()
}

/// Coarse structure: stop words kept, content words masked
fn shape(words: &[String]) -> String {
    words
        .iter()
        .map(|w| if is_stop_word(w) { w.as_str() } else { "*" })
        .collect::<Vec<_>>()
        .join(" ")
}

fn alliterates(words: &[String]) -> bool {
    let initials: Vec<char> = words
        .iter()
        .filter(|w| !is_stop_word(w))
        .filter_map(|w| w.chars().next())
        .collect();
    initials.len() >= 2 && initials.iter().all(|c| *c == initials[0])
}

fn keyword_bonus(words: &[String], keywords: &[&str], cap: f64) -> f64 {
    let hits = words.iter().filter(|w| keywords.contains(&w.as_str())).count();
    (hits as f64 * KEYWORD_BONUS).min(cap)
}

struct Scored {
    result: GenerationResult,
    score: f64,
}

pub struct VarietyOptimizer {
    filter_params: FilterParams,
    phonetic: Arc<PhoneticAnalyzer>,
}

impl VarietyOptimizer {
    pub fn new(filter_params: FilterParams, phonetic: Arc<PhoneticAnalyzer>) -> Self {
        Self {
            filter_params,
            phonetic,
        }
    }

    /// Score one candidate in the context of its batch
    fn score(
        &self,
        result: &GenerationResult,
        request: &GenerationRequest,
        shape_counts: &HashMap<String, usize>,
    ) -> f64 {
        let words = lower_words(&result.name);
        let mut score = BASE_SCORE + length_bonus(&result.name) + source_bonus(result.source);

        if let Some(genre) = request.genre() {
            score += keyword_bonus(&words, genre_keywords(&genre), GENRE_BONUS_CAP);
        }
        if let Some(mood) = request.mood() {
            score += keyword_bonus(&words, mood_keywords(&mood), MOOD_BONUS_CAP);
        }

        if shape_counts.get(&shape(&words)).copied().unwrap_or(0) <= 1 {
            score += UNIQUE_SHAPE_BONUS;
        }
        if alliterates(&words) {
            score += ALLITERATION_BONUS;
        }

        if let Some(phonetic) = &result.phonetic {
            score += phonetic.overall / 10.0;
        }
        score
    }

    pub fn optimize(
        &self,
        candidates: Vec<GenerationResult>,
        request: &GenerationRequest,
        generation_id: Uuid,
    ) -> Result<Vec<GenerationResult>, GenerationError> {
        let input_len = candidates.len();

        let mut seen = HashSet::new();
        let unique: Vec<GenerationResult> = candidates
            .into_iter()
            .filter(|c| seen.insert(lower_words(&c.name).join(" ")))
            .collect();

        let mut shape_counts: HashMap<String, usize> = HashMap::new();
        for c in &unique {
            *shape_counts.entry(shape(&lower_words(&c.name))).or_default() += 1;
        }

        let mut scored = Vec::with_capacity(unique.len());
        for result in unique {
            let score = self.score(&result, request, &shape_counts);
            if !score.is_finite() {
                return Err(GenerationError::Internal(format!(
                    "non-finite variety score for '{}'",
                    result.name
                )));
            }
            scored.push(Scored { result, score });
        }
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));

        let mut gate = BatchGate::from_params(&self.filter_params);
        let gated: Vec<Scored> = scored
            .into_iter()
            .filter(|s| match gate.try_admit(&s.result.name) {
                Ok(()) => true,
                Err(rejection) => {
                    debug!(name = %s.result.name, %rejection, "Optimizer gate dropped candidate");
                    false
                }
            })
            .collect();

        let mut selected = self.cap_sources(gated, request.count);

        if selected.len() < request.count {
            let word_count = match request.word_count {
                WordCount::Exact(n) => n as usize,
                WordCount::FourPlus => WordCount::OPEN_MIN,
            };
            let missing = request.count - selected.len();
            let taken: HashSet<String> = selected.iter().map(|r| r.name.to_lowercase()).collect();
            let offset = (generation_id.as_u128() % 97) as usize;
            let pool = static_names(
                request.content_type,
                word_count,
                (missing + taken.len()) * PAD_POOL_FACTOR,
                offset,
            );

            let mut pad_gate = BatchGate::from_params(&self.filter_params);
            for r in &selected {
                pad_gate.admit(&r.name);
            }
            let mut pads = Vec::with_capacity(missing);
            let mut spare = Vec::new();
            for name in pool.into_iter().filter(|n| !taken.contains(&n.to_lowercase())) {
                if pads.len() >= missing {
                    break;
                }
                match pad_gate.try_admit(&name) {
                    Ok(()) => pads.push(name),
                    Err(_) => spare.push(name),
                }
            }
            if pads.len() < missing {
                let short = missing - pads.len();
                warn!(short, "Static pool exhausted under the batch gate, padding with overlapping names");
                pads.extend(spare.into_iter().take(short));
            }

            for name in pads {
                let phonetic = self.phonetic.score(&name);
                selected.push(GenerationResult::new(name, CandidateSource::StaticPool).with_phonetic(phonetic));
            }
        }

        debug!(
            input = input_len,
            output = selected.len(),
            %generation_id,
            "Optimized batch"
        );
        Ok(selected)
    }

    /// Best-first selection with each source capped at `ceil(count / sources)`,
    /// relaxed when the cap leaves the batch short
    fn cap_sources(&self, ranked: Vec<Scored>, count: usize) -> Vec<GenerationResult> {
        let sources: HashSet<CandidateSource> = ranked.iter().map(|s| s.result.source).collect();
        if sources.is_empty() {
            return Vec::new();
        }
        let cap = count.div_ceil(sources.len()).max(1);

        let mut per_source: HashMap<CandidateSource, usize> = HashMap::new();
        let mut chosen = Vec::with_capacity(count);
        let mut overflow = Vec::new();
        for s in ranked {
            if chosen.len() >= count {
                break;
            }
            let used = per_source.entry(s.result.source).or_default();
            if *used < cap {
                *used += 1;
                chosen.push(s);
            } else {
                overflow.push(s);
            }
        }

        // Relaxation: fill from the best capped-out candidates
        let short = count.saturating_sub(chosen.len());
        chosen.extend(overflow.into_iter().take(short));
        chosen.sort_by(|a, b| b.score.total_cmp(&a.score));
        chosen.into_iter().map(|s| s.result).collect()
    }
}
