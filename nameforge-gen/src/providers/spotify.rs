//! Spotify Web API search client
//!
//! - Artist: `/search?type=artist`
//! - Track: `/search?type=track`
//! - Genre: artist search filtered with `genre:"..."`
//!
//! Takes a bearer token; obtaining it (client-credentials flow) is left to
//! whoever configures the token.

use super::http::{build_client, map_send_error, read_json};
use super::payload::{SpotifyArtist, SpotifyArtistPayload, SpotifyTrack, SpotifyTrackPayload};
use super::{ids, Provider, ProviderError, ProviderQuery, RateLimitPolicy, RawPayload};
use crate::types::Domain;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const SPOTIFY_BASE_URL: &str = "https://api.spotify.com/v1";
const SPOTIFY_TIMEOUT: Duration = Duration::from_secs(10);
/// Spotify caps search pages at 50 items
const SPOTIFY_MAX_LIMIT: usize = 50;

pub struct SpotifyClient {
    http_client: Client,
    token: String,
    base_url: String,
}

#[derive(Debug, Default, Deserialize)]
struct SpFollowers {
    total: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SpArtist {
    id: String,
    name: String,
    #[serde(default)]
    genres: Vec<String>,
    popularity: Option<u8>,
    #[serde(default)]
    followers: SpFollowers,
}

#[derive(Debug, Deserialize)]
struct SpArtistRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SpAlbum {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SpTrack {
    id: String,
    name: String,
    popularity: Option<u8>,
    #[serde(default)]
    artists: Vec<SpArtistRef>,
    album: Option<SpAlbum>,
}

#[derive(Debug, Deserialize)]
struct SpPage<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct SpSearch {
    artists: Option<SpPage<SpArtist>>,
    tracks: Option<SpPage<SpTrack>>,
}

impl SpotifyClient {
    pub fn new(token: impl Into<String>) -> Result<Self, ProviderError> {
        Self::with_base_url(token, SPOTIFY_BASE_URL)
    }

    pub fn with_base_url(
        token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ProviderError::NotConfigured {
                provider: ids::SPOTIFY.to_string(),
                reason: "empty bearer token".to_string(),
            });
        }

        Ok(Self {
            http_client: build_client(ids::SPOTIFY, SPOTIFY_TIMEOUT)?,
            token,
            base_url: base_url.into(),
        })
    }

    fn search_terms(query: &ProviderQuery) -> Result<(String, &'static str), ProviderError> {
        match query.domain {
            Domain::Artist => Ok((query.text.clone(), "artist")),
            Domain::Track => Ok((query.text.clone(), "track")),
            Domain::Genre => Ok((format!("genre:\"{}\"", query.text), "artist")),
            other => Err(ProviderError::Unsupported {
                provider: ids::SPOTIFY.to_string(),
                domain: other,
            }),
        }
    }

    async fn search(&self, query: &ProviderQuery) -> Result<RawPayload, ProviderError> {
        let (q, kind) = Self::search_terms(query)?;
        let limit = query.max_results.min(SPOTIFY_MAX_LIMIT).to_string();

        let response = self
            .http_client
            .get(format!("{}/search", self.base_url))
            .bearer_auth(&self.token)
            .query(&[("q", q.as_str()), ("type", kind), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(|e| map_send_error(ids::SPOTIFY, SPOTIFY_TIMEOUT, e))?;

        let search: SpSearch = read_json(ids::SPOTIFY, response).await?;
        let payload = Self::into_payload(query, search);

        if payload.is_empty() {
            return Err(ProviderError::EmptyPayload {
                provider: ids::SPOTIFY.to_string(),
            });
        }
        Ok(payload)
    }

    fn into_payload(query: &ProviderQuery, search: SpSearch) -> RawPayload {
        match query.domain {
            Domain::Track => RawPayload::SpotifyTrack(SpotifyTrackPayload {
                query: query.text.clone(),
                tracks: search
                    .tracks
                    .map(|p| p.items)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|t| SpotifyTrack {
                        id: t.id,
                        name: t.name,
                        popularity: t.popularity,
                        artists: t.artists.into_iter().map(|a| a.name).collect(),
                        album: t.album.map(|a| a.name),
                    })
                    .collect(),
            }),
            _ => RawPayload::SpotifyArtist(SpotifyArtistPayload {
                query: query.text.clone(),
                artists: search
                    .artists
                    .map(|p| p.items)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|a| SpotifyArtist {
                        id: a.id,
                        name: a.name,
                        genres: a.genres,
                        popularity: a.popularity,
                        followers: a.followers.total,
                    })
                    .collect(),
            }),
        }
    }
}

#[async_trait]
impl Provider for SpotifyClient {
    fn id(&self) -> &str {
        ids::SPOTIFY
    }

    fn domains(&self) -> &[Domain] {
        &[Domain::Artist, Domain::Track, Domain::Genre]
    }

    fn rate_limit_policy(&self) -> RateLimitPolicy {
        RateLimitPolicy::new(3, Duration::from_millis(100), 30, Duration::from_secs(10))
    }

    fn timeout(&self) -> Duration {
        SPOTIFY_TIMEOUT
    }

    async fn fetch(&self, query: &ProviderQuery) -> Result<RawPayload, ProviderError> {
        debug!(domain = %query.domain, text = %query.text, "Querying Spotify");
        self.search(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artist_search_mapping() {
        let json = serde_json::json!({
            "artists": {
                "items": [
                    {"id": "a1", "name": "Khruangbin", "genres": ["psychedelic soul"], "popularity": 72, "followers": {"total": 2000000}},
                    {"id": "a2", "name": "Khruangbin Tribute"}
                ]
            }
        });
        let search: SpSearch = serde_json::from_value(json).unwrap();
        let query = ProviderQuery::new(Domain::Artist, "khruangbin");

        match SpotifyClient::into_payload(&query, search) {
            RawPayload::SpotifyArtist(p) => {
                assert_eq!(p.artists.len(), 2);
                assert_eq!(p.artists[0].popularity, Some(72));
                assert_eq!(p.artists[0].followers, Some(2_000_000));
                assert!(p.artists[1].genres.is_empty());
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_genre_query_uses_filter_syntax() {
        let (q, kind) = SpotifyClient::search_terms(&ProviderQuery::new(Domain::Genre, "shoegaze")).unwrap();
        assert_eq!(q, "genre:\"shoegaze\"");
        assert_eq!(kind, "artist");

        assert!(SpotifyClient::search_terms(&ProviderQuery::new(Domain::Lyrics, "x")).is_err());
    }

    #[test]
    fn test_missing_page_maps_to_empty_payload() {
        let search: SpSearch = serde_json::from_value(serde_json::json!({})).unwrap();
        let payload = SpotifyClient::into_payload(&ProviderQuery::new(Domain::Track, "x"), search);
        assert!(payload.is_empty());
    }
}
