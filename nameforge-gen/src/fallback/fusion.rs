//! Entity fusion
//!
//! Combines normalized entities returned by several providers for the same
//! query. Three strategies:
//!
//! - **best_quality**: highest-confidence entity wins outright
//! - **weighted_average**: entities sharing a normalized name are merged;
//!   genres, terms and popularity are weighted by confidence
//! - **consensus**: entities are clustered by name similarity; the cluster
//!   backed by the most distinct sources wins and earns an agreement boost
//!
//! Fused confidence never exceeds the highest input confidence plus the
//! winning source's trust bonus, and never exceeds 100.

use crate::normalizer::source_trust_bonus;
use crate::types::{FusionStrategy, NormalizedEntity, VocabularyTerm};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Result of fusing several entities
#[derive(Debug, Clone, PartialEq)]
pub struct FusionOutcome {
    pub entity: NormalizedEntity,
    pub alternatives: Vec<NormalizedEntity>,
    pub confidence: f64,
}

pub struct EntityFuser {
    /// Names at least this similar land in the same consensus cluster
    similarity_threshold: f64,
    /// Confidence added per extra agreeing source in consensus mode
    agreement_boost: f64,
}

impl EntityFuser {
    pub fn new() -> Self {
        Self {
            similarity_threshold: 0.85,
            agreement_boost: 5.0,
        }
    }

    pub fn with_thresholds(similarity_threshold: f64, agreement_boost: f64) -> Self {
        Self {
            similarity_threshold: similarity_threshold.clamp(0.0, 1.0),
            agreement_boost: agreement_boost.max(0.0),
        }
    }

    /// Fuse entities; None only for empty input
    pub fn fuse(
        &self,
        strategy: FusionStrategy,
        entities: Vec<NormalizedEntity>,
    ) -> Option<FusionOutcome> {
        if entities.is_empty() {
            return None;
        }

        let ceiling = entities
            .iter()
            .map(|e| e.confidence)
            .fold(f64::MIN, f64::max);

        let mut outcome = match strategy {
            FusionStrategy::BestQuality => Self::best_quality(entities),
            FusionStrategy::WeightedAverage => Self::weighted_average(entities),
            FusionStrategy::Consensus => self.consensus(entities),
        };

        let bound = (ceiling + source_trust_bonus(&outcome.entity.source)).min(100.0);
        outcome.confidence = outcome.confidence.clamp(0.0, bound);

        debug!(
            strategy = ?strategy,
            source = %outcome.entity.source,
            confidence = outcome.confidence,
            alternatives = outcome.alternatives.len(),
            "Fused entities"
        );

        Some(outcome)
    }

    fn sort_by_confidence(entities: &mut [NormalizedEntity]) {
        // Stable: ties keep provider order
        entities.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    fn best_quality(mut entities: Vec<NormalizedEntity>) -> FusionOutcome {
        Self::sort_by_confidence(&mut entities);
        let entity = entities.remove(0);
        FusionOutcome {
            confidence: entity.confidence,
            entity,
            alternatives: entities,
        }
    }

    fn weighted_average(entities: Vec<NormalizedEntity>) -> FusionOutcome {
        // Group by normalized name, keeping first-seen order
        let mut groups: Vec<Vec<NormalizedEntity>> = Vec::new();
        for entity in entities {
            match groups
                .iter_mut()
                .find(|g| g[0].normalized_name == entity.normalized_name)
            {
                Some(group) => group.push(entity),
                None => groups.push(vec![entity]),
            }
        }

        let mut merged: Vec<NormalizedEntity> = groups.into_iter().map(merge_weighted).collect();
        Self::sort_by_confidence(&mut merged);
        let entity = merged.remove(0);

        FusionOutcome {
            confidence: entity.confidence,
            entity,
            alternatives: merged,
        }
    }

    fn consensus(&self, entities: Vec<NormalizedEntity>) -> FusionOutcome {
        let mut clusters: Vec<Vec<NormalizedEntity>> = Vec::new();
        for entity in entities {
            let slot = clusters.iter().position(|cluster| {
                strsim::normalized_levenshtein(&cluster[0].normalized_name, &entity.normalized_name)
                    >= self.similarity_threshold
            });
            match slot {
                Some(i) => clusters[i].push(entity),
                None => clusters.push(vec![entity]),
            }
        }

        let distinct_sources =
            |c: &Vec<NormalizedEntity>| c.iter().map(|e| e.source.as_str()).collect::<HashSet<_>>().len();
        let best_confidence =
            |c: &Vec<NormalizedEntity>| c.iter().map(|e| e.confidence).fold(f64::MIN, f64::max);

        // Most agreement first, then highest confidence; stable for ties
        clusters.sort_by(|a, b| {
            distinct_sources(b).cmp(&distinct_sources(a)).then_with(|| {
                best_confidence(b)
                    .partial_cmp(&best_confidence(a))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
        });

        let mut alternatives = Vec::new();
        let mut clusters = clusters.into_iter();
        let mut winner = clusters.next().unwrap_or_default();
        for rest in clusters {
            alternatives.extend(rest);
        }

        let agreeing = distinct_sources(&winner);
        Self::sort_by_confidence(&mut winner);
        let mut members = winner.into_iter();
        let Some(mut primary) = members.next() else {
            // Unreachable for non-empty input; fall back to the best alternative
            Self::sort_by_confidence(&mut alternatives);
            let entity = alternatives.remove(0);
            return FusionOutcome {
                confidence: entity.confidence,
                entity,
                alternatives,
            };
        };

        let supporters: Vec<NormalizedEntity> = members.collect();
        for supporter in &supporters {
            union_terms(&mut primary.terms, &supporter.terms);
            for genre in &supporter.genres {
                if !primary.genres.contains(genre) {
                    primary.genres.push(genre.clone());
                }
            }
        }

        let boost = (self.agreement_boost * agreeing.saturating_sub(1) as f64)
            .min(source_trust_bonus(&primary.source));
        let confidence = primary.confidence + boost;
        primary.confidence = confidence.min(100.0);

        let mut all_alternatives = supporters;
        all_alternatives.extend(alternatives);
        Self::sort_by_confidence(&mut all_alternatives);

        FusionOutcome {
            confidence,
            entity: primary,
            alternatives: all_alternatives,
        }
    }
}

impl Default for EntityFuser {
    fn default() -> Self {
        Self::new()
    }
}

fn union_terms(into: &mut Vec<VocabularyTerm>, from: &[VocabularyTerm]) {
    let mut seen: HashSet<String> = into.iter().map(|t| t.text.to_lowercase()).collect();
    for term in from {
        if seen.insert(term.text.to_lowercase()) {
            into.push(term.clone());
        }
    }
}

/// Merge entities sharing a normalized name, weighting by confidence
fn merge_weighted(mut group: Vec<NormalizedEntity>) -> NormalizedEntity {
    EntityFuser::sort_by_confidence(&mut group);
    if group.len() == 1 {
        return group.remove(0);
    }

    let total_weight: f64 = group.iter().map(|e| e.confidence.max(0.0)).sum();
    let weight = |e: &NormalizedEntity| {
        if total_weight > 0.0 {
            e.confidence.max(0.0) / total_weight
        } else {
            1.0 / group.len() as f64
        }
    };

    // Weighted mean of confidences (never above the max input)
    let confidence: f64 = group.iter().map(|e| e.confidence * weight(e)).sum();

    let mut genre_weights: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    let mut order = 0;
    for entity in &group {
        for genre in &entity.genres {
            let slot = genre_weights.entry(genre.clone()).or_insert((0.0, order));
            slot.0 += weight(entity);
            order += 1;
        }
    }
    let mut genres: Vec<(String, f64, usize)> = genre_weights
        .into_iter()
        .map(|(g, (w, first))| (g, w, first))
        .collect();
    genres.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.2.cmp(&b.2))
    });

    let popularity_parts: Vec<(f64, f64)> = group
        .iter()
        .filter_map(|e| e.popularity.map(|p| (p as f64, weight(e))))
        .collect();
    let popularity_weight: f64 = popularity_parts.iter().map(|(_, w)| w).sum();
    let popularity = if popularity_parts.is_empty() {
        None
    } else if popularity_weight > 0.0 {
        let mean = popularity_parts.iter().map(|(p, w)| p * w).sum::<f64>() / popularity_weight;
        Some(mean.round().clamp(0.0, 100.0) as u8)
    } else {
        None
    };

    let sources: Vec<&str> = group.iter().map(|e| e.source.as_str()).collect();
    let mut primary = group[0].clone();
    for other in group.iter().skip(1) {
        union_terms(&mut primary.terms, &other.terms);
        for (key, value) in &other.metadata {
            primary
                .metadata
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }
    primary
        .metadata
        .insert("fused_sources".to_string(), serde_json::json!(sources));
    primary.genres = genres.into_iter().map(|(g, _, _)| g).collect();
    primary.popularity = popularity;
    primary.confidence = confidence;
    primary
}
