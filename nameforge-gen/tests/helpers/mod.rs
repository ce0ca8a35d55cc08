//! Shared test helpers: scripted providers and pipeline builders
//!
//! No test here touches the network.

#![allow(dead_code)]

use async_trait::async_trait;
use nameforge_gen::fallback::FallbackManager;
use nameforge_gen::params::{FallbackParams, PipelineParams};
use nameforge_gen::providers::payload::{DatamusePayload, DatamuseWord, LlmCompletionPayload};
use nameforge_gen::providers::{
    Provider, ProviderError, ProviderQuery, ProviderRegistry, RateLimitPolicy, RawPayload,
};
use nameforge_gen::{Domain, Orchestrator, SeededRandom};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What a mock provider does on each call
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Datamuse-shaped word list
    Words(Vec<&'static str>),
    /// Completion-shaped lines (names or words)
    Lines(Vec<&'static str>),
    /// Non-retryable HTTP 400
    Fail,
    /// Sleep past any sensible timeout
    Hang,
}

pub struct MockProvider {
    id: &'static str,
    domains: Vec<Domain>,
    behavior: Mutex<Behavior>,
    calls: AtomicUsize,
    timeout: Duration,
}

impl MockProvider {
    pub fn new(id: &'static str, domains: &[Domain], behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            id,
            domains: domains.to_vec(),
            behavior: Mutex::new(behavior),
            calls: AtomicUsize::new(0),
            timeout: Duration::from_millis(100),
        })
    }

    pub fn set_behavior(&self, behavior: Behavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn id(&self) -> &str {
        self.id
    }

    fn domains(&self) -> &[Domain] {
        &self.domains
    }

    fn rate_limit_policy(&self) -> RateLimitPolicy {
        RateLimitPolicy::unlimited()
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, query: &ProviderQuery) -> Result<RawPayload, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let behavior = self.behavior.lock().unwrap().clone();
        match behavior {
            Behavior::Words(words) => Ok(RawPayload::Datamuse(DatamusePayload {
                query: query.text.clone(),
                words: words
                    .iter()
                    .map(|w| DatamuseWord {
                        word: w.to_string(),
                        score: Some(1000.0),
                        tags: vec!["n".to_string()],
                    })
                    .collect(),
            })),
            Behavior::Lines(lines) => Ok(RawPayload::LlmCompletion(LlmCompletionPayload {
                topic: query.text.clone(),
                domain: query.domain,
                model: "mock".to_string(),
                lines: lines.iter().map(|l| l.to_string()).collect(),
            })),
            Behavior::Fail => Err(ProviderError::Http {
                provider: self.id.to_string(),
                status: 400,
                message: "bad request".to_string(),
            }),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Err(ProviderError::Network {
                    provider: self.id.to_string(),
                    message: "unreachable".to_string(),
                })
            }
        }
    }
}

pub fn registry(providers: &[Arc<MockProvider>]) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    for p in providers {
        registry.register(p.clone());
    }
    registry
}

pub fn fast_params() -> FallbackParams {
    FallbackParams {
        retry_backoff_ms: 1,
        ..FallbackParams::default()
    }
}

pub fn orchestrator(providers: &[Arc<MockProvider>], seed: u64) -> Orchestrator {
    let fallback = FallbackManager::new(registry(providers), fast_params());
    let params = PipelineParams {
        fallback: fast_params(),
        ..PipelineParams::default()
    };
    Orchestrator::new(fallback, params, Arc::new(SeededRandom::from_seed(seed)))
}

/// Healthy vocabulary and names providers under the default strategy ids
pub fn healthy_providers() -> (Arc<MockProvider>, Arc<MockProvider>) {
    let datamuse = MockProvider::new(
        "datamuse",
        &[Domain::Vocabulary, Domain::Genre],
        Behavior::Words(vec![
            "thunder", "amplifier", "riff", "highway", "rebel", "voltage", "asphalt", "chrome",
            "outlaw", "engine", "wildfire", "distortion",
        ]),
    );
    let llm = MockProvider::new(
        "llm",
        &[Domain::Names, Domain::Vocabulary],
        Behavior::Lines(vec![
            "Velvet Harbor Ghosts",
            "Copper Satellite Choir",
            "Broken Neon Parade",
            "Silent Amber Wolves",
            "Crimson Orbit Society",
            "Static Lantern Brigade",
        ]),
    );
    (datamuse, llm)
}
