//! Generation orchestrator
//!
//! Drives one request through the pipeline:
//!
//! 1. Validate and open a new filter generation
//! 2. Gather context concurrently through the fallback manager
//!    (vocabulary, genre, mood, LLM name suggestions)
//! 3. Build per-request word pools and pick a theme
//! 4. Take AI suggestions, then run the bounded pattern loop
//! 5. Salvage and pad when the filter exhausts the budget
//! 6. Optimize for variety and attach metadata
//!
//! Provider failures never surface here as errors; they degrade the output
//! to static vocabulary and static names instead.

use crate::cache::CacheStats;
use crate::error::GenerationError;
use crate::fallback::{DomainStats, FallbackManager, ProviderHealth, ResolveError, ResolveOptions};
use crate::filter::{FilterStats, WordFilter};
use crate::genre_matrix::GenreMatrix;
use crate::genres::canonicalize;
use crate::params::{OrchestratorParams, PipelineParams};
use crate::patterns::{
    resolve_word_count, select_theme, GenerationContext, PatternCategory, PatternLibrary,
    PatternSelector, SelectionCriteria,
};
use crate::phonetic::{PhoneticAnalyzer, PhoneticScore};
use crate::random::RandomSource;
use crate::types::{
    CandidateSource, ContentType, Domain, GenerationRequest, GenerationResponse, GenerationResult,
    ResponseMetadata, VocabularyTerm, WordCount,
};
use crate::variety::VarietyOptimizer;
use crate::words::static_pool::{static_names, structured_phrase};
use crate::words::{WordPools, WordStores};
use futures::future::join_all;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Terms requested from vocabulary lookups
const VOCABULARY_RESULTS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LookupKind {
    Vocabulary,
    Names,
}

struct Lookup {
    kind: LookupKind,
    domain: Domain,
    query: String,
    options: ResolveOptions,
}

/// Everything the context lookups produced
#[derive(Debug, Default)]
struct RequestContext {
    terms: Vec<VocabularyTerm>,
    ai_names: Vec<String>,
    fallback_chain: Vec<String>,
    used_fallback: bool,
}

struct Instantiated {
    name: String,
    source: CandidateSource,
    phonetic: PhoneticScore,
}

/// Health, statistics and filter state in one serializable view
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSnapshot {
    pub providers: HashMap<String, ProviderHealth>,
    pub fallback: BTreeMap<Domain, DomainStats>,
    pub filter: FilterStats,
    pub phonetic_cache: CacheStats,
    pub emergency_cache_entries: usize,
}

/// Song titles ordered for performance: opener first, closer last
#[derive(Debug, Clone, Serialize)]
pub struct SetList {
    pub tracks: Vec<GenerationResult>,
    pub metadata: ResponseMetadata,
}

fn source_for(category: PatternCategory, has_context: bool) -> CandidateSource {
    if !has_context {
        return CandidateSource::StaticFallback;
    }
    match category {
        PatternCategory::Dynamic => CandidateSource::DynamicPattern,
        PatternCategory::Fused => CandidateSource::FusedPattern,
        _ => CandidateSource::Pattern,
    }
}

fn default_topic(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Band => "music",
        ContentType::Song => "song",
    }
}

pub struct Orchestrator {
    params: OrchestratorParams,
    fallback: Arc<FallbackManager>,
    filter: Arc<WordFilter>,
    phonetic: Arc<PhoneticAnalyzer>,
    optimizer: VarietyOptimizer,
    selector: PatternSelector,
    stores: Arc<WordStores>,
    rng: Arc<dyn RandomSource>,
}

impl Orchestrator {
    pub fn new(fallback: FallbackManager, params: PipelineParams, rng: Arc<dyn RandomSource>) -> Self {
        let phonetic = Arc::new(PhoneticAnalyzer::new(&params.phonetic));
        let filter = Arc::new(WordFilter::new(params.filter.clone(), Arc::clone(&rng)));
        let optimizer = VarietyOptimizer::new(params.filter.clone(), Arc::clone(&phonetic));
        let selector = PatternSelector::new(
            Arc::new(PatternLibrary::builtin()),
            Arc::new(GenreMatrix::new()),
        );

        Self {
            params: params.orchestrator,
            fallback: Arc::new(fallback),
            filter,
            phonetic,
            optimizer,
            selector,
            stores: Arc::new(WordStores::builtin()),
            rng,
        }
    }

    pub fn with_word_stores(mut self, stores: WordStores) -> Self {
        self.stores = Arc::new(stores);
        self
    }

    pub fn fallback(&self) -> &FallbackManager {
        &self.fallback
    }

    pub fn filter(&self) -> &WordFilter {
        &self.filter
    }

    pub fn phonetic(&self) -> &PhoneticAnalyzer {
        &self.phonetic
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, GenerationError> {
        request.validate()?;
        let started = Instant::now();
        let generation_id = self.filter.start_new_generation();
        let genre = request.genre();
        let mood = request.mood();

        let context = self.gather_context(request, genre.as_deref(), mood.as_deref()).await;

        let mut pools = WordPools::new(Arc::clone(&self.stores));
        let absorbed = pools.absorb_terms(&context.terms);
        let theme_genre = genre.as_deref().map(|g| canonicalize(g).unwrap_or(g));
        let theme = select_theme(&pools.keywords(), theme_genre, mood.as_deref(), self.rng.as_ref());
        debug!(
            %generation_id,
            absorbed,
            theme = ?theme.map(|t| t.name),
            ai_names = context.ai_names.len(),
            "Context ready"
        );

        let ctx = GenerationContext {
            pools: &pools,
            library: self.selector.library(),
            theme,
            rng: self.rng.as_ref(),
        };

        let target = self.params.candidate_target(request.count);
        let budget = self.params.attempt_budget(request.count);
        let mut attempts = 0usize;
        let mut candidates: Vec<GenerationResult> = Vec::with_capacity(target);
        let mut salvage: Vec<String> = Vec::new();

        for name in &context.ai_names {
            if candidates.len() >= target || attempts >= budget {
                break;
            }
            attempts += 1;
            let tokens = name.split_whitespace().count();
            if !request.word_count.accepts(tokens) {
                if request.word_count.accepts_lenient(tokens) {
                    salvage.push(name.clone());
                }
                debug!(name = %name, tokens, "AI suggestion has wrong word count");
                continue;
            }
            if let Some(result) = self.admit(name, CandidateSource::Ai, request, generation_id) {
                candidates.push(result);
            }
        }

        while candidates.len() < target && attempts < budget {
            attempts += 1;
            let criteria = SelectionCriteria {
                word_count: resolve_word_count(request.word_count, ctx.rng),
                genre: genre.as_deref(),
                mood: mood.as_deref(),
                creativity: self.params.creativity,
                content_type: request.content_type,
            };
            let made = self.instantiate(&criteria, &ctx, attempts);
            if let Some(result) = self.admit_scored(made, request, generation_id) {
                candidates.push(result);
            }
        }

        if candidates.len() < request.count && request.word_count.is_open() {
            for name in salvage {
                if candidates.len() >= request.count {
                    break;
                }
                if let Some(result) = self.admit(&name, CandidateSource::Ai, request, generation_id) {
                    debug!(name = %result.name, "Salvaged with lenient word count");
                    candidates.push(result);
                }
            }
        }

        let mut filler_count = 0;
        if candidates.len() < request.count {
            let missing = request.count - candidates.len();
            warn!(
                %generation_id,
                accepted = candidates.len(),
                requested = request.count,
                attempts,
                "Candidate budget exhausted, padding with static names"
            );
            for result in self.static_filler(request, &candidates, missing, generation_id) {
                self.filter.accept(&result.name, generation_id, Some(request.content_type));
                candidates.push(result);
                filler_count += 1;
            }
        }

        let results = match self.optimizer.optimize(candidates.clone(), request, generation_id) {
            Ok(results) => results,
            Err(e) => {
                warn!(error = %e, "Variety optimization failed, using unoptimized batch");
                candidates.truncate(request.count);
                candidates
            }
        };

        let results: Vec<GenerationResult> = results
            .into_iter()
            .map(|r| {
                if r.phonetic.is_some() {
                    r
                } else {
                    let score = self.phonetic.score(&r.name);
                    r.with_phonetic(score)
                }
            })
            .collect();

        let filler_count = filler_count.max(
            results
                .iter()
                .filter(|r| r.source == CandidateSource::StaticPool)
                .count(),
        );
        let quality = if results.is_empty() {
            0.0
        } else {
            results
                .iter()
                .map(|r| r.phonetic.as_ref().map_or(0.0, |p| p.overall))
                .sum::<f64>()
                / results.len() as f64
        };
        let used_fallback = context.used_fallback
            || filler_count > 0
            || results.iter().any(|r| r.source.is_static());

        info!(
            %generation_id,
            content_type = %request.content_type,
            word_count = %request.word_count,
            emitted = results.len(),
            attempts,
            filler_count,
            used_fallback,
            quality,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Generation complete"
        );

        Ok(GenerationResponse {
            results,
            metadata: ResponseMetadata {
                generation_id,
                used_fallback,
                fallback_chain: context.fallback_chain,
                quality,
                filler_count,
                attempts,
                theme: theme.map(|t| t.name.to_string()),
            },
        })
    }

    /// Song titles ordered with the strongest-sounding opener and the most
    /// memorable closer
    pub async fn generate_setlist(
        &self,
        request: &GenerationRequest,
        songs: usize,
    ) -> Result<SetList, GenerationError> {
        let mut song_request = request.clone();
        song_request.content_type = ContentType::Song;
        song_request.count = songs;

        let response = self.generate(&song_request).await?;
        let mut tracks = response.results;

        let overall = |r: &GenerationResult| r.phonetic.as_ref().map_or(0.0, |p| p.overall);
        let memorability = |r: &GenerationResult| r.phonetic.as_ref().map_or(0.0, |p| p.memorability);

        if let Some(opener) = (0..tracks.len()).max_by(|a, b| overall(&tracks[*a]).total_cmp(&overall(&tracks[*b]))) {
            let track = tracks.remove(opener);
            tracks.insert(0, track);
        }
        if tracks.len() > 2 {
            if let Some(closer) =
                (1..tracks.len()).max_by(|a, b| memorability(&tracks[*a]).total_cmp(&memorability(&tracks[*b])))
            {
                let track = tracks.remove(closer);
                tracks.push(track);
            }
        }

        Ok(SetList {
            tracks,
            metadata: response.metadata,
        })
    }

    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            providers: self.fallback.health(),
            fallback: self.fallback.statistics(),
            filter: self.filter.stats(),
            phonetic_cache: self.phonetic.cache_stats(),
            emergency_cache_entries: self.fallback.emergency_cache_len(),
        }
    }

    /// Stop background sweepers
    pub async fn shutdown(&self) {
        self.fallback.shutdown().await;
        self.phonetic.shutdown().await;
        info!("Orchestrator shut down");
    }

    fn lookups(&self, request: &GenerationRequest, genre: Option<&str>, mood: Option<&str>) -> Vec<Lookup> {
        let topic = genre.or(mood).unwrap_or(default_topic(request.content_type));
        let mut lookups = vec![Lookup {
            kind: LookupKind::Vocabulary,
            domain: Domain::Vocabulary,
            query: topic.to_string(),
            options: ResolveOptions::fused().with_max_results(VOCABULARY_RESULTS),
        }];

        if let Some(genre) = genre {
            lookups.push(Lookup {
                kind: LookupKind::Vocabulary,
                domain: Domain::Genre,
                query: genre.to_string(),
                options: ResolveOptions::default().with_max_results(VOCABULARY_RESULTS),
            });
            if let Some(mood) = mood {
                lookups.push(Lookup {
                    kind: LookupKind::Vocabulary,
                    domain: Domain::Vocabulary,
                    query: mood.to_string(),
                    options: ResolveOptions::default().with_max_results(VOCABULARY_RESULTS),
                });
            }
        }

        let wanted = match request.word_count {
            WordCount::Exact(n) => format!("exactly {} words each", n),
            WordCount::FourPlus => "4 to 10 words each".to_string(),
        };
        lookups.push(Lookup {
            kind: LookupKind::Names,
            domain: Domain::Names,
            query: topic.to_string(),
            options: ResolveOptions::default()
                .with_context(format!("{} names, {}", request.content_type, wanted))
                .with_max_results(request.count * 2),
        });
        lookups
    }

    async fn gather_context(
        &self,
        request: &GenerationRequest,
        genre: Option<&str>,
        mood: Option<&str>,
    ) -> RequestContext {
        let lookups = self.lookups(request, genre, mood);
        let outcomes = join_all(
            lookups
                .iter()
                .map(|l| self.fallback.resolve(l.domain, &l.query, &l.options)),
        )
        .await;

        let mut context = RequestContext::default();
        for (lookup, outcome) in lookups.iter().zip(outcomes) {
            match outcome {
                Ok(fused) => {
                    context.fallback_chain.extend(fused.provenance.fallback_chain.iter().cloned());
                    context.used_fallback |= fused.provenance.emergency_mode;
                    let terms = fused.all_terms();
                    match lookup.kind {
                        LookupKind::Vocabulary => context.terms.extend(terms),
                        LookupKind::Names => context
                            .ai_names
                            .extend(terms.into_iter().map(|t| t.text.trim().to_string()).filter(|t| !t.is_empty())),
                    }
                }
                Err(ResolveError::AllSourcesExhausted { failed_sources, .. }) => {
                    context.fallback_chain.extend(failed_sources);
                    context.used_fallback = true;
                }
                Err(e @ ResolveError::UnknownDomain(_)) => {
                    debug!(error = %e, "Skipping lookup");
                }
            }
        }
        context
    }

    /// Draw patterns until one sounds good enough, keeping the best seen;
    /// a deterministic phrase stands in when every draw fails
    fn instantiate(
        &self,
        criteria: &SelectionCriteria<'_>,
        ctx: &GenerationContext<'_>,
        seed: usize,
    ) -> Instantiated {
        let mut best: Option<Instantiated> = None;

        for _ in 0..self.params.pattern_retry_limit.max(1) {
            let pattern = match self.selector.select(criteria, ctx.rng) {
                Ok(p) => p,
                Err(e) => {
                    warn!(error = %e, "No pattern available");
                    break;
                }
            };

            match pattern.generate(ctx, criteria.word_count) {
                Ok(name) => {
                    let phonetic = self.phonetic.score(&name);
                    let made = Instantiated {
                        name,
                        source: source_for(pattern.category, ctx.pools.has_context()),
                        phonetic,
                    };
                    if made.phonetic.overall >= self.params.min_phonetic_quality {
                        return made;
                    }
                    if best.as_ref().map_or(true, |b| made.phonetic.overall > b.phonetic.overall) {
                        best = Some(made);
                    }
                }
                Err(e) => debug!(pattern = %pattern.id, error = %e, "Pattern failed, retrying"),
            }
        }

        best.unwrap_or_else(|| {
            let name = structured_phrase(criteria.word_count, seed);
            warn!(name = %name, "Pattern retries exhausted, using structured phrase");
            let phonetic = self.phonetic.score(&name);
            Instantiated {
                name,
                source: CandidateSource::StaticFallback,
                phonetic,
            }
        })
    }

    fn admit_scored(
        &self,
        made: Instantiated,
        request: &GenerationRequest,
        generation_id: Uuid,
    ) -> Option<GenerationResult> {
        if !request.word_count.accepts(made.name.split_whitespace().count()) {
            debug!(name = %made.name, "Generated name has wrong word count");
            return None;
        }
        if !self.passes(&made.name, request, generation_id) {
            return None;
        }
        self.filter.accept(&made.name, generation_id, Some(request.content_type));
        Some(GenerationResult::new(made.name, made.source).with_phonetic(made.phonetic))
    }

    fn admit(
        &self,
        name: &str,
        source: CandidateSource,
        request: &GenerationRequest,
        generation_id: Uuid,
    ) -> Option<GenerationResult> {
        if !self.passes(name, request, generation_id) {
            return None;
        }
        self.filter.accept(name, generation_id, Some(request.content_type));
        let phonetic = self.phonetic.score(name);
        Some(GenerationResult::new(name, source).with_phonetic(phonetic))
    }

    fn passes(&self, name: &str, request: &GenerationRequest, generation_id: Uuid) -> bool {
        if self.stores.is_famous(name) {
            debug!(name, "Rejected well-known name");
            return false;
        }
        if self
            .filter
            .should_reject(name, generation_id, Some(request.content_type))
        {
            debug!(name, "Rejected by word filter");
            return false;
        }
        true
    }

    fn static_filler(
        &self,
        request: &GenerationRequest,
        existing: &[GenerationResult],
        missing: usize,
        generation_id: Uuid,
    ) -> Vec<GenerationResult> {
        let word_count = match request.word_count {
            WordCount::Exact(n) => n as usize,
            WordCount::FourPlus => WordCount::OPEN_MIN,
        };
        let taken: HashSet<String> = existing.iter().map(|r| r.name.to_lowercase()).collect();
        let offset = (generation_id.as_u128() % 89) as usize;

        static_names(request.content_type, word_count, missing + taken.len(), offset)
            .into_iter()
            .filter(|n| !taken.contains(&n.to_lowercase()))
            .take(missing)
            .map(|name| {
                let phonetic = self.phonetic.score(&name);
                GenerationResult::new(name, CandidateSource::StaticPool).with_phonetic(phonetic)
            })
            .collect()
    }
}
