//! Provider adapters
//!
//! Each adapter wraps one external source (Datamuse, Last.fm, Spotify, an
//! OpenAI-compatible completion API) behind the `Provider` trait and returns
//! its raw response as a `RawPayload` variant. Mapping into the common shape
//! happens later in `normalizer`.
//!
//! Adapters never retry on their own; retries, timeouts and ordering belong
//! to the fallback manager. Every call is gated by the provider's
//! `ProviderRateLimiter`.

pub mod datamuse;
mod http;
pub mod lastfm;
pub mod llm;
pub mod payload;
pub mod rate_limiter;
pub mod spotify;

use crate::types::Domain;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub use payload::RawPayload;
pub use rate_limiter::{ProviderRateLimiter, RateLimitPermit, RateLimitPolicy};

/// Well-known provider identifiers
pub mod ids {
    pub const DATAMUSE: &str = "datamuse";
    pub const LASTFM: &str = "lastfm";
    pub const SPOTIFY: &str = "spotify";
    pub const LLM: &str = "llm";
}

/// Default per-call timeout when a provider does not override it
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// One lookup against a provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderQuery {
    pub domain: Domain,
    /// Primary search text (artist name, genre, topic word, ...)
    pub text: String,
    /// Free-form hints (content type, word count, mood) used by the LLM prompt
    pub context: Option<String>,
    pub max_results: usize,
}

impl ProviderQuery {
    pub fn new(domain: Domain, text: impl Into<String>) -> Self {
        Self {
            domain,
            text: text.into(),
            context: None,
            max_results: 20,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max.max(1);
        self
    }
}

/// Provider call failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    #[error("{provider}: timed out after {after_ms}ms")]
    Timeout { provider: String, after_ms: u64 },

    #[error("{provider}: HTTP {status}: {message}")]
    Http {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("{provider}: network error: {message}")]
    Network { provider: String, message: String },

    #[error("{provider}: parse error: {message}")]
    Parse { provider: String, message: String },

    #[error("{provider}: empty payload")]
    EmptyPayload { provider: String },

    #[error("{provider}: domain '{domain}' not supported")]
    Unsupported { provider: String, domain: Domain },

    #[error("{provider}: not configured ({reason})")]
    NotConfigured { provider: String, reason: String },

    #[error("{provider}: rate limiter closed")]
    RateLimiterClosed { provider: String },
}

impl ProviderError {
    /// Transient failures worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Timeout { .. } | ProviderError::Network { .. } => true,
            ProviderError::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    pub fn provider(&self) -> &str {
        match self {
            ProviderError::Timeout { provider, .. }
            | ProviderError::Http { provider, .. }
            | ProviderError::Network { provider, .. }
            | ProviderError::Parse { provider, .. }
            | ProviderError::EmptyPayload { provider }
            | ProviderError::Unsupported { provider, .. }
            | ProviderError::NotConfigured { provider, .. }
            | ProviderError::RateLimiterClosed { provider } => provider,
        }
    }
}

/// External data source
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable identifier ("spotify", "lastfm", ...)
    fn id(&self) -> &str;

    /// Domains this provider can answer
    fn domains(&self) -> &[Domain];

    fn supports(&self, domain: Domain) -> bool {
        self.domains().contains(&domain)
    }

    fn rate_limit_policy(&self) -> RateLimitPolicy {
        RateLimitPolicy::default()
    }

    fn timeout(&self) -> Duration {
        DEFAULT_PROVIDER_TIMEOUT
    }

    /// Fetch one raw payload; an empty response is an error, never `Ok`
    async fn fetch(&self, query: &ProviderQuery) -> Result<RawPayload, ProviderError>;
}

/// Provider plus its rate limiter
#[derive(Clone)]
pub struct RegisteredProvider {
    pub provider: Arc<dyn Provider>,
    pub limiter: Arc<ProviderRateLimiter>,
}

/// Providers known to the fallback manager, keyed by id
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, RegisteredProvider>,
    order: Vec<String>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider with its declared rate-limit policy.
    /// Re-registering an id replaces the previous provider.
    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        let policy = provider.rate_limit_policy();
        self.register_with_policy(provider, policy);
    }

    pub fn register_with_policy(&mut self, provider: Arc<dyn Provider>, policy: RateLimitPolicy) {
        let id = provider.id().to_string();
        let limiter = Arc::new(ProviderRateLimiter::new(id.clone(), policy));
        if !self.providers.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.providers
            .insert(id, RegisteredProvider { provider, limiter });
    }

    pub fn get(&self, id: &str) -> Option<&RegisteredProvider> {
        self.providers.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.providers.contains_key(id)
    }

    /// Registered ids in registration order
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    #[async_trait]
    impl Provider for Named {
        fn id(&self) -> &str {
            self.0
        }

        fn domains(&self) -> &[Domain] {
            &[Domain::Vocabulary]
        }

        async fn fetch(&self, _query: &ProviderQuery) -> Result<RawPayload, ProviderError> {
            Err(ProviderError::EmptyPayload {
                provider: self.0.to_string(),
            })
        }
    }

    #[test]
    fn test_registry_keeps_registration_order() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(Named("b")));
        registry.register(Arc::new(Named("a")));
        registry.register(Arc::new(Named("b")));

        assert_eq!(registry.ids(), &["b".to_string(), "a".to_string()]);
        assert_eq!(registry.len(), 2);
        assert!(registry.get("a").unwrap().provider.supports(Domain::Vocabulary));
        assert!(!registry.get("a").unwrap().provider.supports(Domain::Artist));
    }

    #[test]
    fn test_retryable_classification() {
        let timeout = ProviderError::Timeout {
            provider: "x".into(),
            after_ms: 10,
        };
        let throttled = ProviderError::Http {
            provider: "x".into(),
            status: 429,
            message: String::new(),
        };
        let missing = ProviderError::Http {
            provider: "x".into(),
            status: 404,
            message: String::new(),
        };
        let parse = ProviderError::Parse {
            provider: "x".into(),
            message: "bad".into(),
        };

        assert!(timeout.is_retryable());
        assert!(throttled.is_retryable());
        assert!(!missing.is_retryable());
        assert!(!parse.is_retryable());
        assert_eq!(parse.provider(), "x");
    }
}
