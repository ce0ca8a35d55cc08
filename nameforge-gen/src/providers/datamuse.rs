//! Datamuse word-finding API
//!
//! - Vocabulary: words meaning-related to the topic (`ml=`)
//! - Genre: words statistically triggered by the genre name (`rel_trg=`)
//!
//! No API key. Datamuse asks for at most 100k requests per day; the default
//! policy here is well under that.

use super::http::{build_client, map_send_error, read_json};
use super::payload::{DatamusePayload, DatamuseWord};
use super::{ids, Provider, ProviderError, ProviderQuery, RateLimitPolicy, RawPayload};
use crate::types::Domain;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const DATAMUSE_BASE_URL: &str = "https://api.datamuse.com";
const DATAMUSE_TIMEOUT: Duration = Duration::from_secs(8);

pub struct DatamuseClient {
    http_client: Client,
    base_url: String,
}

impl DatamuseClient {
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_base_url(DATAMUSE_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            http_client: build_client(ids::DATAMUSE, DATAMUSE_TIMEOUT)?,
            base_url: base_url.into(),
        })
    }

    fn relation_param(domain: Domain) -> Option<&'static str> {
        match domain {
            Domain::Vocabulary => Some("ml"),
            Domain::Genre => Some("rel_trg"),
            _ => None,
        }
    }
}

#[async_trait]
impl Provider for DatamuseClient {
    fn id(&self) -> &str {
        ids::DATAMUSE
    }

    fn domains(&self) -> &[Domain] {
        &[Domain::Vocabulary, Domain::Genre]
    }

    fn rate_limit_policy(&self) -> RateLimitPolicy {
        RateLimitPolicy::new(4, Duration::from_millis(50), 30, Duration::from_secs(10))
    }

    fn timeout(&self) -> Duration {
        DATAMUSE_TIMEOUT
    }

    async fn fetch(&self, query: &ProviderQuery) -> Result<RawPayload, ProviderError> {
        let relation = Self::relation_param(query.domain).ok_or(ProviderError::Unsupported {
            provider: ids::DATAMUSE.to_string(),
            domain: query.domain,
        })?;

        debug!(domain = %query.domain, text = %query.text, "Querying Datamuse");

        let max = query.max_results.to_string();
        let response = self
            .http_client
            .get(format!("{}/words", self.base_url))
            .query(&[(relation, query.text.as_str()), ("max", max.as_str()), ("md", "p")])
            .send()
            .await
            .map_err(|e| map_send_error(ids::DATAMUSE, DATAMUSE_TIMEOUT, e))?;

        let words: Vec<DatamuseWord> = read_json(ids::DATAMUSE, response).await?;
        if words.is_empty() {
            return Err(ProviderError::EmptyPayload {
                provider: ids::DATAMUSE.to_string(),
            });
        }

        debug!(count = words.len(), "Datamuse query complete");

        Ok(RawPayload::Datamuse(DatamusePayload {
            query: query.text.clone(),
            words,
        }))
    }
}
