//! Per-domain fallback strategies

use crate::providers::ids;
use crate::types::{Domain, FusionStrategy};
use std::collections::BTreeMap;
use std::time::Duration;

/// How a domain is resolved: which providers, in what default order,
/// and what counts as good enough
#[derive(Debug, Clone, PartialEq)]
pub struct DomainStrategy {
    /// Preferred providers; actual order is re-ranked by performance
    pub providers: Vec<String>,
    /// Minimum confidence (0-100) for a result to end the chain early
    pub min_confidence: f64,
    /// Retries per provider for retryable errors
    pub max_retries: u32,
    /// Upper bound per provider call
    pub timeout: Duration,
    pub allow_emergency_cache: bool,
    pub fusion: FusionStrategy,
}

impl DomainStrategy {
    pub fn new(providers: &[&str], min_confidence: f64, fusion: FusionStrategy) -> Self {
        Self {
            providers: providers.iter().map(|p| p.to_string()).collect(),
            min_confidence,
            max_retries: 1,
            timeout: Duration::from_secs(8),
            allow_emergency_cache: true,
            fusion,
        }
    }

    pub fn with_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn without_emergency_cache(mut self) -> Self {
        self.allow_emergency_cache = false;
        self
    }
}

pub fn default_strategies() -> BTreeMap<Domain, DomainStrategy> {
    let mut map = BTreeMap::new();
    map.insert(
        Domain::Artist,
        DomainStrategy::new(&[ids::SPOTIFY, ids::LASTFM], 60.0, FusionStrategy::WeightedAverage)
            .with_retries(2),
    );
    map.insert(
        Domain::Track,
        DomainStrategy::new(&[ids::SPOTIFY, ids::LASTFM], 55.0, FusionStrategy::BestQuality)
            .with_retries(2),
    );
    map.insert(
        Domain::Vocabulary,
        DomainStrategy::new(&[ids::DATAMUSE, ids::LLM], 40.0, FusionStrategy::Consensus)
            .with_timeout(Duration::from_secs(6)),
    );
    map.insert(
        Domain::Genre,
        DomainStrategy::new(
            &[ids::LASTFM, ids::DATAMUSE, ids::SPOTIFY],
            45.0,
            FusionStrategy::WeightedAverage,
        ),
    );
    // Generated text is never worth replaying from cache
    map.insert(
        Domain::Lyrics,
        DomainStrategy::new(&[ids::LLM], 30.0, FusionStrategy::BestQuality)
            .with_retries(0)
            .with_timeout(Duration::from_secs(20))
            .without_emergency_cache(),
    );
    map.insert(
        Domain::Names,
        DomainStrategy::new(&[ids::LLM], 30.0, FusionStrategy::BestQuality)
            .with_retries(0)
            .with_timeout(Duration::from_secs(20))
            .without_emergency_cache(),
    );
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_domain_has_strategy() {
        let strategies = default_strategies();
        for domain in Domain::ALL {
            assert!(strategies.contains_key(&domain), "missing {}", domain);
        }
    }

    #[test]
    fn test_generated_domains_skip_cache() {
        let strategies = default_strategies();
        assert!(!strategies[&Domain::Names].allow_emergency_cache);
        assert!(!strategies[&Domain::Lyrics].allow_emergency_cache);
        assert!(strategies[&Domain::Artist].allow_emergency_cache);
        assert_eq!(strategies[&Domain::Vocabulary].fusion, FusionStrategy::Consensus);
    }
}
