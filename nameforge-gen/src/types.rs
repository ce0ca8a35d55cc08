//! Core Types for the Generation Pipeline
//!
//! Data contracts shared between the pipeline stages:
//! - Request side: `GenerationRequest`, `WordCount`, `ContentType`
//! - Provider side: `Domain`, `NormalizedEntity`, `FusedResult`
//! - Output side: `GenerationResult`, `GenerationResponse`

use crate::error::GenerationError;
use crate::phonetic::PhoneticScore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Maximum names a single request may ask for
pub const MAX_REQUEST_COUNT: usize = 50;

/// Maximum length of free-text genre / mood fields
pub const MAX_LABEL_LEN: usize = 64;

// ============================================================================
// Request Types
// ============================================================================

/// Kind of artifact being named
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Band,
    Song,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Band => "band",
            ContentType::Song => "song",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "band" => Ok(ContentType::Band),
            "song" => Ok(ContentType::Song),
            other => Err(GenerationError::Validation(format!(
                "unknown content type '{}'",
                other
            ))),
        }
    }
}

/// Requested number of words per name
///
/// Either an exact count in `1..=10` or the open-ended "4+" class, which
/// resolves to a concrete count in `[4, 10]` per generated name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordCount {
    Exact(u8),
    FourPlus,
}

impl WordCount {
    pub const MIN: usize = 1;
    pub const MAX: usize = 10;
    pub const OPEN_MIN: usize = 4;
    pub const OPEN_MAX: usize = 10;
    pub const LENIENT_MIN: usize = 3;
    pub const LENIENT_MAX: usize = 11;

    /// Inclusive range of counts this class accepts
    pub fn range(&self) -> (usize, usize) {
        match self {
            WordCount::Exact(n) => (*n as usize, *n as usize),
            WordCount::FourPlus => (Self::OPEN_MIN, Self::OPEN_MAX),
        }
    }

    /// Strict validation of a generated name's token count
    pub fn accepts(&self, tokens: usize) -> bool {
        let (lo, hi) = self.range();
        tokens >= lo && tokens <= hi
    }

    /// Last-resort widening used only when too few candidates validate
    pub fn accepts_lenient(&self, tokens: usize) -> bool {
        match self {
            WordCount::Exact(n) => tokens == *n as usize,
            WordCount::FourPlus => (Self::LENIENT_MIN..=Self::LENIENT_MAX).contains(&tokens),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, WordCount::FourPlus)
    }
}

impl fmt::Display for WordCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordCount::Exact(n) => write!(f, "{}", n),
            WordCount::FourPlus => f.write_str("4+"),
        }
    }
}

impl TryFrom<u64> for WordCount {
    type Error = GenerationError;

    fn try_from(n: u64) -> Result<Self, Self::Error> {
        if (Self::MIN as u64..=Self::MAX as u64).contains(&n) {
            Ok(WordCount::Exact(n as u8))
        } else {
            Err(GenerationError::Validation(format!(
                "word count {} outside {}..={}",
                n,
                Self::MIN,
                Self::MAX
            )))
        }
    }
}

impl FromStr for WordCount {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == "4+" {
            return Ok(WordCount::FourPlus);
        }
        let n: u64 = trimmed.parse().map_err(|_| {
            GenerationError::Validation(format!("word count '{}' is not a number or \"4+\"", s))
        })?;
        WordCount::try_from(n)
    }
}

impl Serialize for WordCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            WordCount::Exact(n) => serializer.serialize_u8(*n),
            WordCount::FourPlus => serializer.serialize_str("4+"),
        }
    }
}

impl<'de> Deserialize<'de> for WordCount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawWordCount {
            Number(u64),
            Text(String),
        }

        let raw = RawWordCount::deserialize(deserializer)?;
        match raw {
            RawWordCount::Number(n) => WordCount::try_from(n).map_err(serde::de::Error::custom),
            RawWordCount::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// A request for a batch of names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub content_type: ContentType,
    pub word_count: WordCount,
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
}

impl GenerationRequest {
    pub fn new(content_type: ContentType, word_count: WordCount, count: usize) -> Self {
        Self {
            content_type,
            word_count,
            count,
            genre: None,
            mood: None,
        }
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_mood(mut self, mood: impl Into<String>) -> Self {
        self.mood = Some(mood.into());
        self
    }

    /// Reject malformed requests before they enter the pipeline
    pub fn validate(&self) -> Result<(), GenerationError> {
        if let WordCount::Exact(n) = self.word_count {
            if !(WordCount::MIN..=WordCount::MAX).contains(&(n as usize)) {
                return Err(GenerationError::Validation(format!(
                    "word count {} outside {}..={}",
                    n,
                    WordCount::MIN,
                    WordCount::MAX
                )));
            }
        }

        if self.count == 0 || self.count > MAX_REQUEST_COUNT {
            return Err(GenerationError::Validation(format!(
                "count {} outside 1..={}",
                self.count, MAX_REQUEST_COUNT
            )));
        }

        for (label, value) in [("genre", &self.genre), ("mood", &self.mood)] {
            if let Some(v) = value {
                if v.chars().count() > MAX_LABEL_LEN {
                    return Err(GenerationError::Validation(format!(
                        "{} longer than {} characters",
                        label, MAX_LABEL_LEN
                    )));
                }
            }
        }

        Ok(())
    }

    /// Trimmed, lowercased genre (None when absent or blank)
    pub fn genre(&self) -> Option<String> {
        clean_label(self.genre.as_deref())
    }

    /// Trimmed, lowercased mood (None when absent or blank)
    pub fn mood(&self) -> Option<String> {
        clean_label(self.mood.as_deref())
    }
}

fn clean_label(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

// ============================================================================
// Output Types
// ============================================================================

/// Where an emitted name came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// Suggested by the LLM completion provider
    Ai,
    /// Fixed hand-authored template
    Pattern,
    /// Pattern assembled from a theme profile at selection time
    DynamicPattern,
    /// Two templates spliced together
    FusedPattern,
    /// Pattern output built only from built-in vocabulary (providers exhausted)
    StaticFallback,
    /// Deterministic filler from the static name pool
    StaticPool,
}

impl CandidateSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateSource::Ai => "ai",
            CandidateSource::Pattern => "pattern",
            CandidateSource::DynamicPattern => "dynamic_pattern",
            CandidateSource::FusedPattern => "fused_pattern",
            CandidateSource::StaticFallback => "static_fallback",
            CandidateSource::StaticPool => "static_pool",
        }
    }

    /// True for anything produced without live provider context
    pub fn is_static(&self) -> bool {
        matches!(
            self,
            CandidateSource::StaticFallback | CandidateSource::StaticPool
        )
    }
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One emitted name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub name: String,
    pub is_generated: bool,
    pub source: CandidateSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<PhoneticScore>,
}

impl GenerationResult {
    pub fn new(name: impl Into<String>, source: CandidateSource) -> Self {
        Self {
            name: name.into(),
            is_generated: source != CandidateSource::StaticPool,
            source,
            phonetic: None,
        }
    }

    pub fn with_phonetic(mut self, score: PhoneticScore) -> Self {
        self.phonetic = Some(score);
        self
    }

    /// Whitespace-separated token count
    pub fn word_count(&self) -> usize {
        self.name.split_whitespace().count()
    }
}

/// Request-level metadata returned alongside the names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub generation_id: Uuid,
    /// True when any context lookup fell back (emergency cache or exhausted)
    pub used_fallback: bool,
    /// Providers tried across all context lookups, in order
    pub fallback_chain: Vec<String>,
    /// Mean phonetic score of the emitted names
    pub quality: f64,
    /// Names padded from the static pool after filter exhaustion
    pub filler_count: usize,
    /// Candidate attempts spent
    pub attempts: usize,
    /// Theme that biased dynamic patterns, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

/// Full response for one generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub results: Vec<GenerationResult>,
    pub metadata: ResponseMetadata,
}

// ============================================================================
// Provider-Side Types
// ============================================================================

/// Logical kind of context lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Artist,
    Track,
    Vocabulary,
    Genre,
    Lyrics,
    /// Candidate names suggested directly by an LLM
    Names,
}

impl Domain {
    pub const ALL: [Domain; 6] = [
        Domain::Artist,
        Domain::Track,
        Domain::Vocabulary,
        Domain::Genre,
        Domain::Lyrics,
        Domain::Names,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Artist => "artist",
            Domain::Track => "track",
            Domain::Vocabulary => "vocabulary",
            Domain::Genre => "genre",
            Domain::Lyrics => "lyrics",
            Domain::Names => "names",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Part of speech attached to harvested vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartOfSpeech {
    Noun,
    Adjective,
    Verb,
    Adverb,
}

/// A word or phrase harvested from a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyTerm {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<PartOfSpeech>,
    /// Provider relevance score normalised to 0..1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance: Option<f64>,
}

impl VocabularyTerm {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            part_of_speech: None,
            relevance: None,
        }
    }

    pub fn with_pos(mut self, pos: PartOfSpeech) -> Self {
        self.part_of_speech = Some(pos);
        self
    }
}

/// Shape of a normalized entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Artist,
    Track,
    Vocabulary,
}

/// Provider response mapped into the common shape
///
/// Created once per provider response and never mutated afterwards; fusion
/// produces new entities rather than editing inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEntity {
    pub id: String,
    pub kind: EntityKind,
    pub name: String,
    pub normalized_name: String,
    pub genres: Vec<String>,
    /// 0..=100 when the provider reports popularity
    pub popularity: Option<u8>,
    pub source: String,
    /// 0..=100
    pub confidence: f64,
    pub terms: Vec<VocabularyTerm>,
    pub metadata: BTreeMap<String, serde_json::Value>,
    /// Creation time; used for cache bookkeeping only
    pub normalized_at: DateTime<Utc>,
}

/// How several normalized entities are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FusionStrategy {
    BestQuality,
    WeightedAverage,
    Consensus,
}

/// Where a fused result came from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    pub fallback_chain: Vec<String>,
    pub successful_sources: Vec<String>,
    pub failed_sources: Vec<String>,
    pub fusion_used: Option<FusionStrategy>,
    pub emergency_mode: bool,
}

/// Output of one Fallback Manager resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FusedResult {
    pub domain: Domain,
    pub query: String,
    /// Primary (winning) entity
    pub entity: NormalizedEntity,
    /// Other entities kept after fusion, best first
    pub alternatives: Vec<NormalizedEntity>,
    /// 0..=100
    pub confidence: f64,
    pub provenance: Provenance,
}

impl FusedResult {
    /// All harvested terms from the primary entity and alternatives, deduplicated
    pub fn all_terms(&self) -> Vec<VocabularyTerm> {
        let mut seen = std::collections::HashSet::new();
        let mut terms = Vec::new();
        for entity in std::iter::once(&self.entity).chain(self.alternatives.iter()) {
            for term in &entity.terms {
                if seen.insert(term.text.to_lowercase()) {
                    terms.push(term.clone());
                }
            }
        }
        terms
    }
}
