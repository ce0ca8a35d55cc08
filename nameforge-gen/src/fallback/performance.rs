//! Rolling provider performance
//!
//! Each provider carries an exponential moving average of its success rate
//! and latency. The first sample seeds both averages; providers that were
//! never called rank as perfect so they get a chance to prove themselves.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Latency at which the ranking penalty reaches its cap
const LATENCY_PENALTY_SCALE_MS: f64 = 20_000.0;
const MAX_LATENCY_PENALTY: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Poor,
}

impl HealthStatus {
    pub fn from_success_rate(rate: f64) -> Self {
        if rate >= 0.8 {
            HealthStatus::Healthy
        } else if rate >= 0.5 {
            HealthStatus::Degraded
        } else {
            HealthStatus::Poor
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ProviderEma {
    success_rate: f64,
    latency_ms: f64,
    samples: u64,
}

/// Per-provider entry of the health snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderHealth {
    pub status: HealthStatus,
    pub success_rate: f64,
    pub avg_latency_ms: f64,
    pub samples: u64,
}

pub struct PerformanceTracker {
    alpha: f64,
    entries: Mutex<HashMap<String, ProviderEma>>,
}

impl PerformanceTracker {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: if alpha.is_finite() { alpha.clamp(0.01, 1.0) } else { 0.3 },
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, ProviderEma>> {
        self.entries.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn record(&self, provider: &str, success: bool, latency: Duration) {
        let sample = if success { 1.0 } else { 0.0 };
        let latency_ms = latency.as_secs_f64() * 1000.0;
        let alpha = self.alpha;

        let mut entries = self.lock();
        match entries.get_mut(provider) {
            Some(ema) => {
                ema.success_rate = alpha * sample + (1.0 - alpha) * ema.success_rate;
                ema.latency_ms = alpha * latency_ms + (1.0 - alpha) * ema.latency_ms;
                ema.samples += 1;
            }
            None => {
                entries.insert(
                    provider.to_string(),
                    ProviderEma {
                        success_rate: sample,
                        latency_ms,
                        samples: 1,
                    },
                );
            }
        }
    }

    /// Ranking score; higher is better
    pub fn score(&self, provider: &str) -> f64 {
        match self.lock().get(provider) {
            Some(ema) => {
                ema.success_rate
                    - (ema.latency_ms / LATENCY_PENALTY_SCALE_MS).min(MAX_LATENCY_PENALTY)
            }
            None => 1.0,
        }
    }

    pub fn success_rate(&self, provider: &str) -> Option<f64> {
        self.lock().get(provider).map(|e| e.success_rate)
    }

    /// Order candidates best-first
    ///
    /// The sort is stable, so equal scores keep the strategy's order and
    /// ordering is deterministic for a given history. A hinted provider
    /// present in the list is moved to the front.
    pub fn rank(&self, candidates: &[String], hint: Option<&str>) -> Vec<String> {
        let mut scored: Vec<(String, f64)> = candidates
            .iter()
            .map(|id| (id.clone(), self.score(id)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut ordered: Vec<String> = scored.into_iter().map(|(id, _)| id).collect();
        if let Some(hint) = hint {
            if let Some(pos) = ordered.iter().position(|id| id == hint) {
                let pinned = ordered.remove(pos);
                ordered.insert(0, pinned);
            }
        }
        ordered
    }

    pub fn health(&self) -> HashMap<String, ProviderHealth> {
        self.lock()
            .iter()
            .map(|(id, ema)| {
                (
                    id.clone(),
                    ProviderHealth {
                        status: HealthStatus::from_success_rate(ema.success_rate),
                        success_rate: ema.success_rate,
                        avg_latency_ms: ema.latency_ms,
                        samples: ema.samples,
                    },
                )
            })
            .collect()
    }
}
