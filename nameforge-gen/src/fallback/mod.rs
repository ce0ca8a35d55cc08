//! Fallback manager
//!
//! Resolves a domain lookup (artist, track, vocabulary, genre, lyrics, names)
//! against the registered providers:
//!
//! 1. Rank the strategy's providers by rolling performance (hint pinned first)
//! 2. Call them one at a time under rate limit, timeout and retry budgets
//! 3. Stop at the first result meeting the strategy's minimum confidence,
//!    or after `fusion_max_sources` successes when fusing
//! 4. Fuse successful entities into one `FusedResult`
//! 5. With every provider down, serve the emergency cache at a discount
//!
//! Provider failures never escape this module; callers only see
//! `ResolveError::AllSourcesExhausted` when nothing at all is available.

pub mod fusion;
pub mod performance;
pub mod statistics;
pub mod strategy;

use crate::cache::{MaintenanceTask, TtlCache};
use crate::normalizer::normalize;
use crate::params::FallbackParams;
use crate::providers::{ProviderError, ProviderQuery, ProviderRegistry, RegisteredProvider};
use crate::types::{Domain, FusedResult, FusionStrategy, NormalizedEntity, Provenance};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, warn};

pub use fusion::{EntityFuser, FusionOutcome};
pub use performance::{HealthStatus, PerformanceTracker, ProviderHealth};
pub use statistics::{DomainStats, FallbackStatistics};
pub use strategy::{default_strategies, DomainStrategy};

/// Chain entry recorded when the emergency cache served a result
pub const EMERGENCY_CACHE_SOURCE: &str = "emergency_cache";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("all sources exhausted for {domain} '{query}' (failed: {})", failed_sources.join(", "))]
    AllSourcesExhausted {
        domain: Domain,
        query: String,
        failed_sources: Vec<String>,
    },

    #[error("no fallback strategy for domain {0}")]
    UnknownDomain(Domain),
}

/// Per-call knobs for `FallbackManager::resolve`
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Provider to try first regardless of ranking
    pub primary_hint: Option<String>,
    /// Collect several successes and fuse them
    pub fuse: bool,
    pub context: Option<String>,
    pub max_results: Option<usize>,
}

impl ResolveOptions {
    pub fn fused() -> Self {
        Self {
            fuse: true,
            ..Self::default()
        }
    }

    pub fn with_hint(mut self, provider: impl Into<String>) -> Self {
        self.primary_hint = Some(provider.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = Some(max);
        self
    }
}

pub struct FallbackManager {
    registry: ProviderRegistry,
    strategies: BTreeMap<Domain, DomainStrategy>,
    params: FallbackParams,
    performance: PerformanceTracker,
    statistics: FallbackStatistics,
    fuser: EntityFuser,
    emergency: Arc<TtlCache<String, FusedResult>>,
    sweeper: Mutex<Option<MaintenanceTask>>,
}

fn emergency_key(domain: Domain, query: &str) -> String {
    format!("{}:{}", domain, query.trim().to_lowercase())
}

impl FallbackManager {
    /// Build a manager over `registry` with the default per-domain strategies.
    /// Starts the emergency-cache sweeper when a tokio runtime is available.
    pub fn new(registry: ProviderRegistry, params: FallbackParams) -> Self {
        let emergency = Arc::new(TtlCache::new(
            params.emergency_capacity,
            params.emergency_ttl(),
        ));

        let sweep_target = Arc::clone(&emergency);
        let sweeper = MaintenanceTask::spawn("emergency-cache-sweep", params.sweep_interval(), move || {
            let removed = sweep_target.sweep();
            if removed > 0 {
                debug!(removed, "Swept expired emergency cache entries");
            }
        });

        info!(
            providers = registry.len(),
            emergency_ttl_secs = params.emergency_ttl_secs,
            "Fallback manager initialized"
        );

        Self {
            registry,
            strategies: default_strategies(),
            performance: PerformanceTracker::new(params.ema_alpha),
            statistics: FallbackStatistics::new(),
            fuser: EntityFuser::new(),
            emergency,
            sweeper: Mutex::new(sweeper),
            params,
        }
    }

    pub fn with_strategy(mut self, domain: Domain, strategy: DomainStrategy) -> Self {
        self.strategies.insert(domain, strategy);
        self
    }

    pub fn without_strategy(mut self, domain: Domain) -> Self {
        self.strategies.remove(&domain);
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn strategy(&self, domain: Domain) -> Option<&DomainStrategy> {
        self.strategies.get(&domain)
    }

    pub fn health(&self) -> HashMap<String, ProviderHealth> {
        self.performance.health()
    }

    pub fn performance(&self) -> &PerformanceTracker {
        &self.performance
    }

    pub fn statistics(&self) -> BTreeMap<Domain, DomainStats> {
        self.statistics.snapshot()
    }

    pub fn emergency_cache_len(&self) -> usize {
        self.emergency.len()
    }

    /// Providers that would be tried for `domain`, in order
    pub fn provider_order(&self, domain: Domain, hint: Option<&str>) -> Vec<String> {
        let Some(strategy) = self.strategies.get(&domain) else {
            return Vec::new();
        };

        let available: Vec<String> = strategy
            .providers
            .iter()
            .filter(|id| {
                self.registry
                    .get(id)
                    .map(|r| r.provider.supports(domain))
                    .unwrap_or(false)
            })
            .cloned()
            .collect();

        // A registered hint outside the strategy list is still honored
        let mut ranked = self.performance.rank(&available, hint);
        if let Some(hint) = hint {
            if !ranked.iter().any(|id| id == hint)
                && self
                    .registry
                    .get(hint)
                    .map(|r| r.provider.supports(domain))
                    .unwrap_or(false)
            {
                ranked.insert(0, hint.to_string());
            }
        }
        ranked
    }

    pub async fn resolve(
        &self,
        domain: Domain,
        query: &str,
        options: &ResolveOptions,
    ) -> Result<FusedResult, ResolveError> {
        let strategy = self
            .strategies
            .get(&domain)
            .ok_or(ResolveError::UnknownDomain(domain))?;

        let mut provider_query = ProviderQuery::new(domain, query);
        if let Some(context) = &options.context {
            provider_query = provider_query.with_context(context.clone());
        }
        if let Some(max) = options.max_results {
            provider_query = provider_query.with_max_results(max);
        }

        let order = self.provider_order(domain, options.primary_hint.as_deref());
        debug!(domain = %domain, query, order = ?order, fuse = options.fuse, "Resolving");

        let fusion_cap = self.params.fusion_max_sources.max(1);
        let mut provenance = Provenance::default();
        let mut successes: Vec<NormalizedEntity> = Vec::new();

        for id in &order {
            let Some(registered) = self.registry.get(id) else {
                continue;
            };
            provenance.fallback_chain.push(id.clone());

            match self.call_provider(registered, strategy, &provider_query).await {
                Ok(entity) => {
                    let meets = entity.confidence >= strategy.min_confidence;
                    debug!(
                        provider = %id,
                        domain = %domain,
                        confidence = entity.confidence,
                        meets_threshold = meets,
                        "Provider succeeded"
                    );
                    provenance.successful_sources.push(id.clone());
                    successes.push(entity);

                    if options.fuse {
                        if successes.len() >= fusion_cap {
                            break;
                        }
                    } else if meets {
                        break;
                    }
                }
                Err(e) => {
                    warn!(provider = %id, domain = %domain, error = %e, "Provider failed, trying next");
                    provenance.failed_sources.push(id.clone());
                }
            }
        }

        if !successes.is_empty() {
            let fusion = if successes.len() > 1 {
                Some(strategy.fusion)
            } else {
                None
            };
            let outcome = self
                .fuser
                .fuse(fusion.unwrap_or(FusionStrategy::BestQuality), successes);

            if let Some(outcome) = outcome {
                provenance.fusion_used = fusion;
                let result = FusedResult {
                    domain,
                    query: query.to_string(),
                    entity: outcome.entity,
                    alternatives: outcome.alternatives,
                    confidence: outcome.confidence,
                    provenance,
                };

                if strategy.allow_emergency_cache && result.confidence >= strategy.min_confidence {
                    self.emergency
                        .insert(emergency_key(domain, query), result.clone());
                }

                self.statistics.record_success(domain, result.confidence);
                return Ok(result);
            }
        }

        if strategy.allow_emergency_cache {
            if let Some(mut cached) = self.emergency.get(&emergency_key(domain, query)) {
                let discount = self.params.emergency_discount.clamp(0.0, 1.0);
                let discounted = |c: f64| (c * discount).clamp(0.0, 100.0);
                cached.confidence = discounted(cached.confidence);
                cached.entity.confidence = discounted(cached.entity.confidence);
                for alt in &mut cached.alternatives {
                    alt.confidence = discounted(alt.confidence);
                }

                provenance.fallback_chain.push(EMERGENCY_CACHE_SOURCE.to_string());
                provenance.successful_sources = vec![EMERGENCY_CACHE_SOURCE.to_string()];
                provenance.fusion_used = cached.provenance.fusion_used;
                provenance.emergency_mode = true;
                cached.provenance = provenance;

                warn!(
                    domain = %domain,
                    query,
                    confidence = cached.confidence,
                    "All providers failed, serving emergency cache"
                );
                self.statistics.record_emergency(domain, cached.confidence);
                return Ok(cached);
            }
        }

        self.statistics.record_failure(domain);
        error!(
            domain = %domain,
            query,
            failed = ?provenance.failed_sources,
            "All sources exhausted"
        );
        Err(ResolveError::AllSourcesExhausted {
            domain,
            query: query.to_string(),
            failed_sources: provenance.failed_sources,
        })
    }

    /// One provider, with retries for transient failures
    async fn call_provider(
        &self,
        registered: &RegisteredProvider,
        strategy: &DomainStrategy,
        query: &ProviderQuery,
    ) -> Result<NormalizedEntity, ProviderError> {
        let provider = &registered.provider;
        let id = provider.id().to_string();
        let timeout = strategy.timeout.min(provider.timeout());
        let mut attempt: u32 = 0;

        loop {
            let started = Instant::now();
            let outcome = {
                let _permit = registered.limiter.acquire().await?;
                let call_started = Instant::now();
                let result = match tokio::time::timeout(timeout, provider.fetch(query)).await {
                    Ok(Ok(payload)) if payload.is_empty() => Err(ProviderError::EmptyPayload {
                        provider: id.clone(),
                    }),
                    Ok(result) => result,
                    Err(_) => Err(ProviderError::Timeout {
                        provider: id.clone(),
                        after_ms: timeout.as_millis() as u64,
                    }),
                };
                (result, call_started.elapsed())
            };

            let (result, latency) = outcome;
            self.performance.record(&id, result.is_ok(), latency);

            match result {
                Ok(payload) => {
                    debug!(
                        provider = %id,
                        kind = payload.kind(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Provider returned payload"
                    );
                    return Ok(normalize(&payload, &id, query.domain));
                }
                Err(e) if e.is_retryable() && attempt < strategy.max_retries => {
                    let backoff = self.params.retry_backoff() * 2u32.saturating_pow(attempt);
                    debug!(
                        provider = %id,
                        attempt = attempt + 1,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Retrying provider"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Stop the background sweeper
    pub async fn shutdown(&self) {
        let task = self
            .sweeper
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take();
        if let Some(task) = task {
            task.shutdown().await;
            debug!("Fallback manager sweeper stopped");
        }
    }
}

/// Strategy without retries and with a short call timeout
pub fn quick_strategy(providers: &[&str], min_confidence: f64, fusion: FusionStrategy) -> DomainStrategy {
    DomainStrategy::new(providers, min_confidence, fusion)
        .with_retries(0)
        .with_timeout(Duration::from_secs(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::payload::{DatamusePayload, DatamuseWord};
    use crate::providers::{Provider, RateLimitPolicy, RawPayload};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        id: &'static str,
        words: Vec<&'static str>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn ok(id: &'static str, words: Vec<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                id,
                words,
                fail: false,
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(id: &'static str) -> Arc<Self> {
            Arc::new(Self {
                id,
                words: vec![],
                fail: true,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Provider for Scripted {
        fn id(&self) -> &str {
            self.id
        }

        fn domains(&self) -> &[Domain] {
            &[Domain::Vocabulary]
        }

        fn rate_limit_policy(&self) -> RateLimitPolicy {
            RateLimitPolicy::unlimited()
        }

        async fn fetch(&self, query: &ProviderQuery) -> Result<RawPayload, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ProviderError::Network {
                    provider: self.id.to_string(),
                    message: "down".into(),
                });
            }
            Ok(RawPayload::Datamuse(DatamusePayload {
                query: query.text.clone(),
                words: self
                    .words
                    .iter()
                    .map(|w| DatamuseWord {
                        word: w.to_string(),
                        score: Some(1000.0),
                        tags: vec!["n".into()],
                    })
                    .collect(),
            }))
        }
    }

    fn manager(providers: Vec<Arc<Scripted>>) -> FallbackManager {
        let mut registry = ProviderRegistry::new();
        let ids: Vec<&'static str> = providers.iter().map(|p| p.id).collect();
        for p in providers {
            registry.register(p);
        }
        let params = FallbackParams {
            retry_backoff_ms: 1,
            ..FallbackParams::default()
        };
        FallbackManager::new(registry, params).with_strategy(
            Domain::Vocabulary,
            quick_strategy(&ids, 40.0, FusionStrategy::Consensus),
        )
    }

    #[tokio::test]
    async fn test_first_good_provider_wins() {
        let a = Scripted::ok("a", vec!["ocean", "tide"]);
        let b = Scripted::ok("b", vec!["wave"]);
        let fm = manager(vec![a.clone(), b.clone()]);

        let result = fm
            .resolve(Domain::Vocabulary, "sea", &ResolveOptions::default())
            .await
            .unwrap();

        assert_eq!(result.provenance.successful_sources, vec!["a"]);
        assert_eq!(b.calls.load(Ordering::SeqCst), 0);
        assert!(!result.provenance.emergency_mode);
        assert_eq!(fm.emergency_cache_len(), 1);
    }

    #[tokio::test]
    async fn test_failure_falls_through_and_updates_ema() {
        let a = Scripted::failing("a");
        let b = Scripted::ok("b", vec!["wave"]);
        let fm = manager(vec![a, b]);

        let result = fm
            .resolve(Domain::Vocabulary, "sea", &ResolveOptions::default())
            .await
            .unwrap();

        assert_eq!(result.provenance.failed_sources, vec!["a"]);
        assert_eq!(result.provenance.fallback_chain, vec!["a", "b"]);
        assert_eq!(fm.performance().success_rate("a"), Some(0.0));
        // "a" now ranks below "b"
        assert_eq!(fm.provider_order(Domain::Vocabulary, None), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_fuse_collects_multiple_sources() {
        let fm = manager(vec![
            Scripted::ok("a", vec!["ocean"]),
            Scripted::ok("b", vec!["tide"]),
        ]);

        let result = fm
            .resolve(Domain::Vocabulary, "sea", &ResolveOptions::fused())
            .await
            .unwrap();

        assert_eq!(result.provenance.successful_sources.len(), 2);
        assert_eq!(result.provenance.fusion_used, Some(FusionStrategy::Consensus));
        let terms: Vec<String> = result.all_terms().into_iter().map(|t| t.text).collect();
        assert!(terms.contains(&"ocean".to_string()));
        assert!(terms.contains(&"tide".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_domain() {
        let fm = manager(vec![]).without_strategy(Domain::Artist);
        let err = fm
            .resolve(Domain::Artist, "x", &ResolveOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, ResolveError::UnknownDomain(Domain::Artist));
    }

    #[tokio::test]
    async fn test_exhausted_without_cache() {
        let fm = manager(vec![Scripted::failing("a")]);
        let err = fm
            .resolve(Domain::Vocabulary, "sea", &ResolveOptions::default())
            .await
            .unwrap_err();

        match err {
            ResolveError::AllSourcesExhausted { failed_sources, .. } => {
                assert_eq!(failed_sources, vec!["a"])
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(fm.statistics()[&Domain::Vocabulary].failures, 1);
        fm.shutdown().await;
    }
}
