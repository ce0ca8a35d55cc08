//! Per-domain resolution statistics

use crate::types::Domain;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainStats {
    pub attempts: u64,
    pub successes: u64,
    pub failures: u64,
    pub emergency_hits: u64,
    /// Mean confidence of successful resolutions
    pub avg_quality: f64,
}

#[derive(Default)]
pub struct FallbackStatistics {
    domains: Mutex<BTreeMap<Domain, DomainStats>>,
}

impl FallbackStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    fn update(&self, domain: Domain, f: impl FnOnce(&mut DomainStats)) {
        let mut domains = self.domains.lock().unwrap_or_else(|p| p.into_inner());
        f(domains.entry(domain).or_default());
    }

    pub fn record_success(&self, domain: Domain, confidence: f64) {
        self.update(domain, |stats| {
            stats.attempts += 1;
            stats.successes += 1;
            let n = stats.successes as f64;
            stats.avg_quality += (confidence - stats.avg_quality) / n;
        });
    }

    /// Emergency hits count as successes served from cache
    pub fn record_emergency(&self, domain: Domain, confidence: f64) {
        self.record_success(domain, confidence);
        self.update(domain, |stats| stats.emergency_hits += 1);
    }

    pub fn record_failure(&self, domain: Domain) {
        self.update(domain, |stats| {
            stats.attempts += 1;
            stats.failures += 1;
        });
    }

    pub fn snapshot(&self) -> BTreeMap<Domain, DomainStats> {
        self.domains
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }
}
