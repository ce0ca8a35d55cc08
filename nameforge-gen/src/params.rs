//! Pipeline tuning parameters
//!
//! Parsed from the `[pipeline]` table of `nameforge.toml`. Every field has a
//! compiled default so a partial table (or none at all) is valid.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Repetition guard windows and probabilities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    /// Words seen this recently are rejected outright (same content type)
    pub very_recent_window_secs: u64,
    /// Words seen within this window are rejected with `recent_reject_probability`
    pub recent_window_secs: u64,
    /// History horizon; older entries are purged
    pub history_horizon_secs: u64,
    pub cross_type_reject_probability: f64,
    pub recent_reject_probability: f64,
    /// Rejection chance for words older than the recent window but inside the horizon
    pub extended_reject_probability: f64,
    /// Share of significant words that may overlap the current batch
    pub overlap_ratio: f64,
    /// Absolute cap on overlapping significant words
    pub overlap_cap: usize,
    pub max_history_entries: usize,
    /// Tokens shorter than this never count as significant
    pub significant_min_len: usize,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            very_recent_window_secs: 120,
            recent_window_secs: 600,
            history_horizon_secs: 3600,
            cross_type_reject_probability: 0.25,
            recent_reject_probability: 0.5,
            extended_reject_probability: 0.3,
            overlap_ratio: 0.6,
            overlap_cap: 2,
            max_history_entries: 2000,
            significant_min_len: 4,
        }
    }
}

/// Fallback manager tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackParams {
    /// EMA smoothing factor for provider success rate and latency
    pub ema_alpha: f64,
    pub emergency_ttl_secs: u64,
    /// Confidence multiplier applied to emergency-cache hits
    pub emergency_discount: f64,
    pub emergency_capacity: usize,
    /// Successful responses collected before fusing
    pub fusion_max_sources: usize,
    pub retry_backoff_ms: u64,
    pub sweep_interval_secs: u64,
}

impl Default for FallbackParams {
    fn default() -> Self {
        Self {
            ema_alpha: 0.3,
            emergency_ttl_secs: 4 * 3600,
            emergency_discount: 0.8,
            emergency_capacity: 500,
            fusion_max_sources: 3,
            retry_backoff_ms: 200,
            sweep_interval_secs: 300,
        }
    }
}

impl FallbackParams {
    pub fn emergency_ttl(&self) -> Duration {
        Duration::from_secs(self.emergency_ttl_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Phonetic score cache sizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhoneticParams {
    pub cache_capacity: usize,
    pub cache_ttl_secs: u64,
    pub sweep_interval_secs: u64,
}

impl Default for PhoneticParams {
    fn default() -> Self {
        Self {
            cache_capacity: 2000,
            cache_ttl_secs: 3600,
            sweep_interval_secs: 600,
        }
    }
}

/// Orchestrator budgets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorParams {
    /// Attempt budget is `max(min_attempts, count * attempt_multiplier)`
    pub attempt_multiplier: usize,
    pub min_attempts: usize,
    /// Extra candidates gathered beyond `count` so the optimizer has a choice
    pub overgeneration_ratio: f64,
    /// 0..1; higher favours dynamic and fused patterns
    pub creativity: f64,
    /// Pattern re-draws per candidate before the hardcoded phrase is used
    pub pattern_retry_limit: usize,
    /// Phonetic overall score a pattern candidate should reach
    pub min_phonetic_quality: f64,
}

impl Default for OrchestratorParams {
    fn default() -> Self {
        Self {
            attempt_multiplier: 10,
            min_attempts: 30,
            overgeneration_ratio: 0.5,
            creativity: 0.5,
            pattern_retry_limit: 5,
            min_phonetic_quality: 45.0,
        }
    }
}

impl OrchestratorParams {
    pub fn attempt_budget(&self, count: usize) -> usize {
        self.min_attempts.max(count.saturating_mul(self.attempt_multiplier))
    }

    pub fn candidate_target(&self, count: usize) -> usize {
        let extra = (count as f64 * self.overgeneration_ratio.max(0.0)).ceil() as usize;
        count + extra
    }
}

/// All pipeline tuning
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    pub filter: FilterParams,
    pub fallback: FallbackParams,
    pub phonetic: PhoneticParams,
    pub orchestrator: OrchestratorParams,
}

impl PipelineParams {
    /// Parse from the raw `[pipeline]` table
    pub fn from_table(table: &toml::Table) -> Result<Self, toml::de::Error> {
        toml::Value::Table(table.clone()).try_into()
    }

    /// Parse with graceful degradation: malformed tables fall back to defaults
    pub fn from_optional_table(table: Option<&toml::Table>) -> Self {
        match table {
            None => Self::default(),
            Some(t) => Self::from_table(t).unwrap_or_else(|e| {
                warn!("Invalid [pipeline] table ({}), using defaults", e);
                Self::default()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_table_keeps_defaults() {
        let table: toml::Table = toml::from_str(
            r#"
            [filter]
            recent_window_secs = 300

            [orchestrator]
            creativity = 0.9
            "#,
        )
        .unwrap();

        let params = PipelineParams::from_table(&table).unwrap();
        assert_eq!(params.filter.recent_window_secs, 300);
        assert_eq!(params.filter.very_recent_window_secs, 120);
        assert_eq!(params.orchestrator.creativity, 0.9);
        assert_eq!(params.fallback, FallbackParams::default());
    }

    #[test]
    fn test_malformed_table_falls_back_to_defaults() {
        let table: toml::Table = toml::from_str(
            r#"
            [filter]
            recent_window_secs = "ten minutes"
            "#,
        )
        .unwrap();

        assert!(PipelineParams::from_table(&table).is_err());
        assert_eq!(
            PipelineParams::from_optional_table(Some(&table)),
            PipelineParams::default()
        );
    }

    #[test]
    fn test_attempt_budget() {
        let params = OrchestratorParams::default();
        assert_eq!(params.attempt_budget(1), 30);
        assert_eq!(params.attempt_budget(10), 100);
        assert_eq!(params.candidate_target(4), 6);
        assert_eq!(params.candidate_target(1), 2);
    }
}
