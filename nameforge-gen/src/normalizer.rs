//! Data Normalizer
//!
//! Maps any `RawPayload` into a `NormalizedEntity`. Pure apart from the
//! `normalized_at` timestamp: the same payload, source and domain always
//! produce the same id, name, genres, terms and confidence.
//!
//! # Confidence (0-100)
//! | Signal | Points |
//! |---|---|
//! | base | 10 |
//! | non-empty name | 20 |
//! | at least one canonical genre | 15 |
//! | popularity known | 10 |
//! | terms present | 15 + 0.5 per term (max 20 terms) |
//! | metadata richness | 2 per key (max 10) |
//! | source trust bonus | see `source_trust_bonus` |

use crate::genres;
use crate::providers::ids;
use crate::providers::payload::*;
use crate::providers::RawPayload;
use crate::types::{Domain, EntityKind, NormalizedEntity, PartOfSpeech, VocabularyTerm};
use chrono::Utc;
use serde_json::json;
use std::collections::BTreeMap;

/// Fixed per-source bonus added to confidence
pub fn source_trust_bonus(source_id: &str) -> f64 {
    match source_id {
        ids::SPOTIFY => 15.0,
        ids::LASTFM => 10.0,
        ids::DATAMUSE => 8.0,
        ids::LLM => 5.0,
        _ => 0.0,
    }
}

/// Lowercase, punctuation-free, whitespace-collapsed form without a leading "the"
pub fn normalize_name(name: &str) -> String {
    let cleaned: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() || c == '\'' { c } else { ' ' })
        .collect();
    let collapsed = cleaned
        .split_whitespace()
        .map(|w| w.trim_matches('\''))
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    match collapsed.strip_prefix("the ") {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => collapsed,
    }
}

/// Listener count to 0-100 on a log scale (10M listeners = 100)
fn popularity_from_listeners(listeners: u64) -> u8 {
    let scaled = ((listeners as f64 + 1.0).log10() / 7.0 * 100.0).clamp(0.0, 100.0);
    scaled.round() as u8
}

fn canonical_genres<'a>(tags: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        if let Some(canonical) = genres::canonicalize(tag) {
            if !out.iter().any(|g| g == canonical) {
                out.push(canonical.to_string());
            }
        }
    }
    out
}

fn pos_from_datamuse_tags(tags: &[String]) -> Option<PartOfSpeech> {
    tags.iter().find_map(|t| match t.as_str() {
        "n" => Some(PartOfSpeech::Noun),
        "adj" => Some(PartOfSpeech::Adjective),
        "v" => Some(PartOfSpeech::Verb),
        "adv" => Some(PartOfSpeech::Adverb),
        _ => None,
    })
}

fn phrase_terms<'a>(phrases: impl IntoIterator<Item = &'a String>) -> Vec<VocabularyTerm> {
    phrases
        .into_iter()
        .filter(|p| !p.trim().is_empty())
        .map(|p| VocabularyTerm::new(p.trim()))
        .collect()
}

/// Fields extracted from a payload before scoring
struct Extracted {
    kind: EntityKind,
    name: String,
    genres: Vec<String>,
    popularity: Option<u8>,
    terms: Vec<VocabularyTerm>,
    metadata: BTreeMap<String, serde_json::Value>,
}

fn extract(payload: &RawPayload, domain: Domain) -> Extracted {
    match payload {
        RawPayload::Datamuse(p) => {
            let max_score = p
                .words
                .iter()
                .filter_map(|w| w.score)
                .fold(0.0_f64, f64::max);
            let terms = p
                .words
                .iter()
                .map(|w| VocabularyTerm {
                    text: w.word.clone(),
                    part_of_speech: pos_from_datamuse_tags(&w.tags),
                    relevance: w
                        .score
                        .filter(|_| max_score > 0.0)
                        .map(|s| (s / max_score).clamp(0.0, 1.0)),
                })
                .collect();

            let mut metadata = BTreeMap::new();
            metadata.insert("word_count".to_string(), json!(p.words.len()));
            if max_score > 0.0 {
                metadata.insert("top_score".to_string(), json!(max_score));
            }

            Extracted {
                kind: EntityKind::Vocabulary,
                name: p.query.clone(),
                genres: if domain == Domain::Genre {
                    canonical_genres([&p.query])
                } else {
                    Vec::new()
                },
                popularity: None,
                terms,
                metadata,
            }
        }

        RawPayload::LastFmArtist(p) => {
            let mut terms = phrase_terms(&p.tags);
            terms.extend(phrase_terms(&p.similar));

            let mut metadata = BTreeMap::new();
            if let Some(mbid) = &p.mbid {
                metadata.insert("mbid".to_string(), json!(mbid));
            }
            if let Some(url) = &p.url {
                metadata.insert("url".to_string(), json!(url));
            }
            if let Some(listeners) = p.listeners {
                metadata.insert("listeners".to_string(), json!(listeners));
            }
            metadata.insert("similar_count".to_string(), json!(p.similar.len()));

            Extracted {
                kind: EntityKind::Artist,
                name: p.name.clone(),
                genres: canonical_genres(&p.tags),
                popularity: p.listeners.map(popularity_from_listeners),
                terms,
                metadata,
            }
        }

        RawPayload::LastFmTrack(p) => {
            let top = p.tracks.first();
            let mut terms = phrase_terms(p.tracks.iter().map(|t| &t.name));
            terms.extend(phrase_terms(p.tracks.iter().map(|t| &t.artist)));

            let mut metadata = BTreeMap::new();
            metadata.insert("match_count".to_string(), json!(p.tracks.len()));
            if let Some(top) = top {
                metadata.insert("artist".to_string(), json!(top.artist));
            }

            Extracted {
                kind: EntityKind::Track,
                name: top.map(|t| t.name.clone()).unwrap_or_else(|| p.query.clone()),
                genres: Vec::new(),
                popularity: top.and_then(|t| t.listeners).map(popularity_from_listeners),
                terms,
                metadata,
            }
        }

        RawPayload::LastFmTag(p) => {
            let mut metadata = BTreeMap::new();
            metadata.insert("artist_count".to_string(), json!(p.artists.len()));

            Extracted {
                kind: EntityKind::Vocabulary,
                name: p.tag.clone(),
                genres: canonical_genres([&p.tag]),
                popularity: None,
                terms: phrase_terms(&p.artists),
                metadata,
            }
        }

        RawPayload::SpotifyArtist(p) => {
            let top = p.artists.first();
            let all_genres: Vec<&String> = p.artists.iter().flat_map(|a| a.genres.iter()).collect();

            let mut terms = phrase_terms(all_genres.iter().copied());
            terms.extend(phrase_terms(p.artists.iter().map(|a| &a.name)));

            let mut metadata = BTreeMap::new();
            metadata.insert("result_count".to_string(), json!(p.artists.len()));
            if let Some(top) = top {
                metadata.insert("spotify_id".to_string(), json!(top.id));
                if let Some(followers) = top.followers {
                    metadata.insert("followers".to_string(), json!(followers));
                }
            }

            // Genre lookups describe the genre itself, not the top artist
            if domain == Domain::Genre {
                Extracted {
                    kind: EntityKind::Vocabulary,
                    name: p.query.clone(),
                    genres: canonical_genres([&p.query]),
                    popularity: None,
                    terms,
                    metadata,
                }
            } else {
                Extracted {
                    kind: EntityKind::Artist,
                    name: top.map(|a| a.name.clone()).unwrap_or_else(|| p.query.clone()),
                    genres: top.map(|a| canonical_genres(&a.genres)).unwrap_or_default(),
                    popularity: top.and_then(|a| a.popularity).map(|v| v.min(100)),
                    terms,
                    metadata,
                }
            }
        }

        RawPayload::SpotifyTrack(p) => {
            let top = p.tracks.first();
            let mut terms = phrase_terms(p.tracks.iter().map(|t| &t.name));
            terms.extend(phrase_terms(p.tracks.iter().flat_map(|t| t.artists.iter())));
            terms.extend(phrase_terms(p.tracks.iter().filter_map(|t| t.album.as_ref())));

            let mut metadata = BTreeMap::new();
            metadata.insert("result_count".to_string(), json!(p.tracks.len()));
            if let Some(top) = top {
                metadata.insert("spotify_id".to_string(), json!(top.id));
                metadata.insert("artists".to_string(), json!(top.artists));
                if let Some(album) = &top.album {
                    metadata.insert("album".to_string(), json!(album));
                }
            }

            Extracted {
                kind: EntityKind::Track,
                name: top.map(|t| t.name.clone()).unwrap_or_else(|| p.query.clone()),
                genres: Vec::new(),
                popularity: top.and_then(|t| t.popularity).map(|v| v.min(100)),
                terms,
                metadata,
            }
        }

        RawPayload::LlmCompletion(p) => {
            let mut metadata = BTreeMap::new();
            metadata.insert("model".to_string(), json!(p.model));
            metadata.insert("line_count".to_string(), json!(p.lines.len()));
            metadata.insert("prompt_domain".to_string(), json!(p.domain.as_str()));

            Extracted {
                kind: EntityKind::Vocabulary,
                name: p.topic.clone(),
                genres: if domain == Domain::Genre {
                    canonical_genres([&p.topic])
                } else {
                    Vec::new()
                },
                popularity: None,
                terms: phrase_terms(&p.lines),
                metadata,
            }
        }
    }
}

fn score(extracted: &Extracted, source_id: &str) -> f64 {
    let mut confidence = 10.0;
    if !extracted.name.trim().is_empty() {
        confidence += 20.0;
    }
    if !extracted.genres.is_empty() {
        confidence += 15.0;
    }
    if extracted.popularity.is_some() {
        confidence += 10.0;
    }
    if !extracted.terms.is_empty() {
        confidence += 15.0 + extracted.terms.len().min(20) as f64 * 0.5;
    }
    confidence += (extracted.metadata.len() as f64 * 2.0).min(10.0);
    confidence += source_trust_bonus(source_id);
    confidence.clamp(0.0, 100.0)
}

/// Map a provider payload into the common entity shape
pub fn normalize(payload: &RawPayload, source_id: &str, domain: Domain) -> NormalizedEntity {
    let extracted = extract(payload, domain);
    let confidence = score(&extracted, source_id);
    let normalized_name = normalize_name(&extracted.name);

    NormalizedEntity {
        id: format!("{}:{}:{}", source_id, domain, normalized_name),
        kind: extracted.kind,
        name: extracted.name.trim().to_string(),
        normalized_name,
        genres: extracted.genres,
        popularity: extracted.popularity,
        source: source_id.to_string(),
        confidence,
        terms: extracted.terms,
        metadata: extracted.metadata,
        normalized_at: Utc::now(),
    }
}
