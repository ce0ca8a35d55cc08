//! OpenAI-compatible chat completion client
//!
//! Serves three domains:
//! - Names: candidate band names / song titles, one per line
//! - Vocabulary: evocative single words for a topic
//! - Lyrics: short lyric lines whose words seed the pools

use super::http::{build_client, map_send_error, read_json};
use super::payload::LlmCompletionPayload;
use super::{ids, Provider, ProviderError, ProviderQuery, RateLimitPolicy, RawPayload};
use crate::types::Domain;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
const LLM_TIMEOUT: Duration = Duration::from_secs(20);
const MAX_LINES: usize = 50;

pub struct LlmClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

impl LlmClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: Option<String>,
        model: Option<String>,
    ) -> Result<Self, ProviderError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ProviderError::NotConfigured {
                provider: ids::LLM.to_string(),
                reason: "empty API key".to_string(),
            });
        }

        Ok(Self {
            http_client: build_client(ids::LLM, LLM_TIMEOUT)?,
            api_key,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: model.unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
        })
    }

    fn prompt(query: &ProviderQuery) -> Result<String, ProviderError> {
        let hints = query
            .context
            .as_deref()
            .map(|c| format!(" Constraints: {}.", c))
            .unwrap_or_default();

        match query.domain {
            Domain::Names => Ok(format!(
                "Suggest {} original names themed around \"{}\".{} \
                 Reply with one name per line, no numbering, no commentary.",
                query.max_results, query.text, hints
            )),
            Domain::Vocabulary => Ok(format!(
                "List {} evocative single English words associated with \"{}\".{} \
                 Reply with one lowercase word per line.",
                query.max_results, query.text, hints
            )),
            Domain::Lyrics => Ok(format!(
                "Write 4 short original lyric lines about \"{}\".{} One line each.",
                query.text, hints
            )),
            other => Err(ProviderError::Unsupported {
                provider: ids::LLM.to_string(),
                domain: other,
            }),
        }
    }
}

/// Split a completion into clean lines, dropping list markers and quotes
pub(crate) fn parse_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(|c: char| c.is_ascii_digit() || matches!(c, '.' | ')' | '-' | '*' | '•'))
                .trim()
                .trim_matches(|c| c == '"' || c == '\'')
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .take(MAX_LINES)
        .collect()
}

#[async_trait]
impl Provider for LlmClient {
    fn id(&self) -> &str {
        ids::LLM
    }

    fn domains(&self) -> &[Domain] {
        &[Domain::Names, Domain::Vocabulary, Domain::Lyrics]
    }

    fn rate_limit_policy(&self) -> RateLimitPolicy {
        RateLimitPolicy::new(2, Duration::from_millis(250), 10, Duration::from_secs(10))
    }

    fn timeout(&self) -> Duration {
        LLM_TIMEOUT
    }

    async fn fetch(&self, query: &ProviderQuery) -> Result<RawPayload, ProviderError> {
        let prompt = Self::prompt(query)?;
        debug!(domain = %query.domain, text = %query.text, model = %self.model, "Requesting completion");

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "You are a creative assistant for musicians.".to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.9,
            max_tokens: 300,
        };

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| map_send_error(ids::LLM, LLM_TIMEOUT, e))?;

        let completion: ChatResponse = read_json(ids::LLM, response).await?;
        let text = completion
            .choices
            .into_iter()
            .filter_map(|c| c.message.content)
            .next()
            .unwrap_or_default();

        let lines = parse_lines(&text);
        if lines.is_empty() {
            return Err(ProviderError::EmptyPayload {
                provider: ids::LLM.to_string(),
            });
        }

        Ok(RawPayload::LlmCompletion(LlmCompletionPayload {
            topic: query.text.clone(),
            domain: query.domain,
            model: completion.model.unwrap_or_else(|| self.model.clone()),
            lines,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lines_strips_markers() {
        let text = "1. \"Velvet Static\"\n2) Neon Harbor\n\n- Paper Wolves\n* 'Glass Parade'\n";
        assert_eq!(
            parse_lines(text),
            vec!["Velvet Static", "Neon Harbor", "Paper Wolves", "Glass Parade"]
        );
    }

    #[test]
    fn test_prompt_per_domain() {
        let names = LlmClient::prompt(
            &ProviderQuery::new(Domain::Names, "jazz")
                .with_max_results(5)
                .with_context("band names, 2 words"),
        )
        .unwrap();
        assert!(names.contains("Suggest 5"));
        assert!(names.contains("band names, 2 words"));

        assert!(LlmClient::prompt(&ProviderQuery::new(Domain::Artist, "x")).is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = LlmClient::new("key", Some("http://localhost:8080/v1/".into()), None).unwrap();
        assert_eq!(client.base_url, "http://localhost:8080/v1");
        assert_eq!(client.model, DEFAULT_LLM_MODEL);
    }
}
