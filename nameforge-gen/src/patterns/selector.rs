//! Weighted pattern selection
//!
//! Each candidate pattern's base weight is scaled by three factors:
//!
//! - creativity: fixed templates lose weight as creativity rises, dynamic
//!   and fused patterns gain it
//! - genre: best genre-matrix score against the pattern's genres
//! - mood: boost on match, mild penalty when the pattern names other moods

use super::{PatternCategory, PatternDefinition, PatternLibrary};
use crate::error::PatternError;
use crate::genre_matrix::GenreMatrix;
use crate::random::{RandomExt, RandomSource};
use crate::types::{ContentType, WordCount};
use std::sync::Arc;
use tracing::debug;

const MOOD_MATCH_FACTOR: f64 = 1.5;
const MOOD_MISMATCH_FACTOR: f64 = 0.8;

#[derive(Debug, Clone, Copy)]
pub struct SelectionCriteria<'a> {
    /// Concrete word count (already resolved from "4+")
    pub word_count: usize,
    pub genre: Option<&'a str>,
    pub mood: Option<&'a str>,
    /// 0..1
    pub creativity: f64,
    pub content_type: ContentType,
}

/// Concrete count for one name; "4+" draws uniformly from `[4, 10]`
pub fn resolve_word_count(word_count: WordCount, rng: &dyn RandomSource) -> usize {
    match word_count {
        WordCount::Exact(n) => n as usize,
        WordCount::FourPlus => rng.range_inclusive(WordCount::OPEN_MIN, WordCount::OPEN_MAX),
    }
}

pub struct PatternSelector {
    library: Arc<PatternLibrary>,
    matrix: Arc<GenreMatrix>,
}

impl PatternSelector {
    pub fn new(library: Arc<PatternLibrary>, matrix: Arc<GenreMatrix>) -> Self {
        Self { library, matrix }
    }

    pub fn library(&self) -> &PatternLibrary {
        &self.library
    }

    /// Effective draw weight of `pattern` under `criteria`
    pub fn weight_for(&self, pattern: &PatternDefinition, criteria: &SelectionCriteria<'_>) -> f64 {
        let c = criteria.creativity.clamp(0.0, 1.0);
        let creativity = match pattern.category {
            PatternCategory::Dynamic => 0.5 + c,
            PatternCategory::Fused => 0.25 + 1.5 * c,
            _ => 1.5 - c,
        };

        let genre = match criteria.genre {
            Some(genre) if !pattern.genres.is_empty() => 0.5 + self.matrix.best_match(genre, &pattern.genres),
            _ => 1.0,
        };

        let mood = match criteria.mood {
            Some(mood) if !pattern.moods.is_empty() => {
                if pattern.moods.iter().any(|m| *m == mood) {
                    MOOD_MATCH_FACTOR
                } else {
                    MOOD_MISMATCH_FACTOR
                }
            }
            _ => 1.0,
        };

        (pattern.weight * creativity * genre * mood).max(0.0)
    }

    /// Weighted random draw among patterns supporting the word count
    pub fn select(
        &self,
        criteria: &SelectionCriteria<'_>,
        rng: &dyn RandomSource,
    ) -> Result<&PatternDefinition, PatternError> {
        let candidates = self
            .library
            .require_candidates(criteria.word_count, criteria.content_type)?;

        let weights: Vec<f64> = candidates.iter().map(|p| self.weight_for(p, criteria)).collect();
        let index = rng
            .weighted_index(&weights)
            .unwrap_or_else(|| rng.below(candidates.len()));

        let chosen = candidates
            .get(index)
            .copied()
            .ok_or(PatternError::NoPatternForCount(criteria.word_count))?;
        debug!(
            pattern = %chosen.id,
            word_count = criteria.word_count,
            candidates = candidates.len(),
            "Selected pattern"
        );
        Ok(chosen)
    }
}
