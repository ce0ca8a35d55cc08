//! Last.fm API client
//!
//! - Artist: `artist.getinfo` (tags, similar artists, listener count)
//! - Track: `track.search`
//! - Genre: `tag.gettopartists`
//!
//! Requires an API key. Last.fm reports application errors with HTTP 200 and
//! an `error` field in the body, so both are checked.

use super::http::{build_client, map_send_error};
use super::payload::{LastFmArtistPayload, LastFmTagPayload, LastFmTrackMatch, LastFmTrackPayload};
use super::{ids, Provider, ProviderError, ProviderQuery, RateLimitPolicy, RawPayload};
use crate::types::Domain;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const LASTFM_BASE_URL: &str = "https://ws.audioscrobbler.com/2.0/";
const LASTFM_TIMEOUT: Duration = Duration::from_secs(10);

pub struct LastFmClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

// Wire format. Last.fm serialises numbers as strings.

#[derive(Debug, Deserialize)]
struct LfmError {
    error: u32,
    message: String,
}

#[derive(Debug, Deserialize)]
struct LfmName {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct LfmTagList {
    #[serde(default)]
    tag: Vec<LfmName>,
}

#[derive(Debug, Default, Deserialize)]
struct LfmSimilar {
    #[serde(default)]
    artist: Vec<LfmName>,
}

#[derive(Debug, Default, Deserialize)]
struct LfmStats {
    listeners: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LfmArtist {
    name: String,
    mbid: Option<String>,
    url: Option<String>,
    #[serde(default)]
    stats: LfmStats,
    #[serde(default)]
    tags: LfmTagList,
    #[serde(default)]
    similar: LfmSimilar,
}

#[derive(Debug, Deserialize)]
struct LfmArtistInfo {
    artist: LfmArtist,
}

#[derive(Debug, Deserialize)]
struct LfmTrackMatch {
    name: String,
    artist: String,
    listeners: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LfmTrackMatches {
    #[serde(default)]
    track: Vec<LfmTrackMatch>,
}

#[derive(Debug, Deserialize)]
struct LfmTrackResults {
    #[serde(default)]
    trackmatches: LfmTrackMatches,
}

#[derive(Debug, Deserialize)]
struct LfmTrackSearch {
    results: LfmTrackResults,
}

#[derive(Debug, Default, Deserialize)]
struct LfmTopArtists {
    #[serde(default)]
    artist: Vec<LfmName>,
}

#[derive(Debug, Deserialize)]
struct LfmTagTopArtists {
    topartists: LfmTopArtists,
}

fn parse_count(value: Option<&String>) -> Option<u64> {
    value.and_then(|v| v.trim().parse().ok())
}

impl LastFmClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, LASTFM_BASE_URL)
    }

    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ProviderError::NotConfigured {
                provider: ids::LASTFM.to_string(),
                reason: "empty API key".to_string(),
            });
        }

        Ok(Self {
            http_client: build_client(ids::LASTFM, LASTFM_TIMEOUT)?,
            api_key,
            base_url: base_url.into(),
        })
    }

    async fn call(&self, params: &[(&str, &str)]) -> Result<serde_json::Value, ProviderError> {
        let response = self
            .http_client
            .get(&self.base_url)
            .query(params)
            .query(&[("api_key", self.api_key.as_str()), ("format", "json")])
            .send()
            .await
            .map_err(|e| map_send_error(ids::LASTFM, LASTFM_TIMEOUT, e))?;

        let status = response.status();
        let body: serde_json::Value = response.json().await.map_err(|e| ProviderError::Parse {
            provider: ids::LASTFM.to_string(),
            message: e.to_string(),
        })?;

        if let Ok(err) = serde_json::from_value::<LfmError>(body.clone()) {
            return Err(ProviderError::Http {
                provider: ids::LASTFM.to_string(),
                status: if status.is_success() { 400 } else { status.as_u16() },
                message: format!("Last.fm error {}: {}", err.error, err.message),
            });
        }
        if !status.is_success() {
            return Err(ProviderError::Http {
                provider: ids::LASTFM.to_string(),
                status: status.as_u16(),
                message: String::new(),
            });
        }

        Ok(body)
    }

    fn decode<T: serde::de::DeserializeOwned>(body: serde_json::Value) -> Result<T, ProviderError> {
        serde_json::from_value(body).map_err(|e| ProviderError::Parse {
            provider: ids::LASTFM.to_string(),
            message: e.to_string(),
        })
    }

    fn empty() -> ProviderError {
        ProviderError::EmptyPayload {
            provider: ids::LASTFM.to_string(),
        }
    }

    async fn artist_info(&self, query: &ProviderQuery) -> Result<RawPayload, ProviderError> {
        let body = self
            .call(&[("method", "artist.getinfo"), ("artist", query.text.as_str()), ("autocorrect", "1")])
            .await?;
        let info: LfmArtistInfo = Self::decode(body)?;
        let artist = info.artist;

        if artist.name.trim().is_empty() {
            return Err(Self::empty());
        }

        Ok(RawPayload::LastFmArtist(LastFmArtistPayload {
            listeners: parse_count(artist.stats.listeners.as_ref()),
            tags: artist.tags.tag.into_iter().map(|t| t.name).collect(),
            similar: artist.similar.artist.into_iter().map(|a| a.name).collect(),
            name: artist.name,
            mbid: artist.mbid.filter(|m| !m.is_empty()),
            url: artist.url,
        }))
    }

    async fn track_search(&self, query: &ProviderQuery) -> Result<RawPayload, ProviderError> {
        let limit = query.max_results.to_string();
        let body = self
            .call(&[("method", "track.search"), ("track", query.text.as_str()), ("limit", limit.as_str())])
            .await?;
        let search: LfmTrackSearch = Self::decode(body)?;

        let tracks: Vec<LastFmTrackMatch> = search
            .results
            .trackmatches
            .track
            .into_iter()
            .map(|t| LastFmTrackMatch {
                listeners: parse_count(t.listeners.as_ref()),
                name: t.name,
                artist: t.artist,
            })
            .collect();

        if tracks.is_empty() {
            return Err(Self::empty());
        }

        Ok(RawPayload::LastFmTrack(LastFmTrackPayload {
            query: query.text.clone(),
            tracks,
        }))
    }

    async fn tag_top_artists(&self, query: &ProviderQuery) -> Result<RawPayload, ProviderError> {
        let limit = query.max_results.to_string();
        let body = self
            .call(&[("method", "tag.gettopartists"), ("tag", query.text.as_str()), ("limit", limit.as_str())])
            .await?;
        let top: LfmTagTopArtists = Self::decode(body)?;

        let artists: Vec<String> = top.topartists.artist.into_iter().map(|a| a.name).collect();
        if artists.is_empty() {
            return Err(Self::empty());
        }

        Ok(RawPayload::LastFmTag(LastFmTagPayload {
            tag: query.text.clone(),
            artists,
        }))
    }
}

#[async_trait]
impl Provider for LastFmClient {
    fn id(&self) -> &str {
        ids::LASTFM
    }

    fn domains(&self) -> &[Domain] {
        &[Domain::Artist, Domain::Track, Domain::Genre]
    }

    fn rate_limit_policy(&self) -> RateLimitPolicy {
        // Last.fm asks for no more than 5 requests per second
        RateLimitPolicy::new(2, Duration::from_millis(200), 25, Duration::from_secs(10))
    }

    fn timeout(&self) -> Duration {
        LASTFM_TIMEOUT
    }

    async fn fetch(&self, query: &ProviderQuery) -> Result<RawPayload, ProviderError> {
        debug!(domain = %query.domain, text = %query.text, "Querying Last.fm");

        match query.domain {
            Domain::Artist => self.artist_info(query).await,
            Domain::Track => self.track_search(query).await,
            Domain::Genre => self.tag_top_artists(query).await,
            other => Err(ProviderError::Unsupported {
                provider: ids::LASTFM.to_string(),
                domain: other,
            }),
        }
    }
}
